//! In-memory content, for tools and tests

use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Arc;

use parking_lot::RwLock;

use folio_core::ContentId;

use super::{ContentReader, ContentStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<ContentId, Arc<[u8]>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: ContentId, body: impl Into<Vec<u8>>) {
        let body: Vec<u8> = body.into();
        self.files.write().insert(id, Arc::from(body));
    }

    pub fn remove(&self, id: &ContentId) -> bool {
        self.files.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn list_files(&self, prefix: &ContentId) -> io::Result<Vec<ContentId>> {
        Ok(self
            .files
            .read()
            .keys()
            .filter(|id| id.relative_to(prefix).is_some())
            .cloned()
            .collect())
    }

    fn open(&self, id: &ContentId) -> io::Result<Option<ContentReader<'_>>> {
        let body = self.files.read().get(id).cloned();
        Ok(body.map(|body| Box::new(Cursor::new(body)) as ContentReader<'_>))
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ContentId {
        raw.parse().unwrap()
    }

    #[test]
    fn test_prefix_listing() {
        let store = MemoryStore::new();
        store.insert(id("folio:guide/en_us/entries/a.json"), "{}");
        store.insert(id("folio:guide/en_us/entries/sub/b.json"), "{}");
        store.insert(id("folio:guide/en_us/entriesx/c.json"), "{}");
        store.insert(id("other:guide/en_us/entries/d.json"), "{}");

        let listed = store.list_files(&id("folio:guide/en_us/entries")).unwrap();
        assert_eq!(
            listed,
            vec![id("folio:guide/en_us/entries/a.json"), id("folio:guide/en_us/entries/sub/b.json")]
        );
        assert!(store.remove(&id("folio:guide/en_us/entries/a.json")));
        assert!(store.open(&id("folio:guide/en_us/entries/a.json")).unwrap().is_none());
    }
}
