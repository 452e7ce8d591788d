//! Content stores the loader reads from

use std::io::{self, Read};

use folio_core::ContentId;

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

/// Stream over one content file
pub type ContentReader<'a> = Box<dyn Read + Send + 'a>;

/// Storage holding content files, keyed by identifier
pub trait ContentStore: Send + Sync {
    /// Every file below `prefix`, recursively, sorted by id
    fn list_files(&self, prefix: &ContentId) -> io::Result<Vec<ContentId>>;

    /// Open one file; `Ok(None)` when it does not exist
    fn open(&self, id: &ContentId) -> io::Result<Option<ContentReader<'_>>>;

    /// Get the store name/path
    fn source_name(&self) -> &str;
}
