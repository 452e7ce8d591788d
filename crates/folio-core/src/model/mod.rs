//! Book content model: the book, its categories, entries and pages

mod book;
mod category;
mod entry;
mod graph;
mod page;
pub mod pages;

pub use book::{ordinal, Book, BookDocument, BookIcon, Edition};
pub use category::{Category, CategoryDocument};
pub use entry::{Entry, EntryDocument};
pub use graph::{BookGraph, ObjectMapping};
pub use page::{NoTemplates, Page, PageBuildContext, PageContent, PageRegistry, TemplateResolver};
