//! Content loading for folio books
//!
//! Content stores, locale resolution, the per-book loader and the library
//! of registered books.

pub mod config;
pub mod contents;
pub mod extensions;
pub mod index;
pub mod library;
pub mod localization;
pub mod sources;

// Re-exports
pub use config::{ContentKind, LoaderConfig};
pub use contents::{BookContents, LoadContext, LoadSummary};
pub use extensions::Extensions;
pub use index::ObjectIndex;
pub use library::Library;
pub use localization::LocalizationResolver;
pub use sources::{ContentReader, ContentStore, DirectoryStore, MemoryStore};
