//! Core model for the folio documentation viewer
//! 
//! This crate provides the content identifiers, the polymorphic type registry,
//! the document parser, the book graph and the navigation/read-state machinery
//! shared by the loader and any presentation layer.

pub mod document;
pub mod environment;
pub mod error;
pub mod id;
pub mod model;
pub mod navigation;
pub mod read_state;
pub mod registry;

// Re-export commonly used types
pub use document::{Decoded, DocumentParser, DISCRIMINATOR};
pub use environment::{Environment, StaticEnvironment};
pub use error::BookError;
pub use id::{ContentId, ObjectKey};
pub use model::{
    Book, BookGraph, BookIcon, Category, Edition, Entry, Page, PageContent, PageRegistry,
    TemplateResolver,
};
pub use navigation::{BookView, NavigationContext, Navigator, ViewLocation};
pub use read_state::{ReadNode, ReadState, ReadTracker};
pub use registry::{Decoder, TypeRegistry};
