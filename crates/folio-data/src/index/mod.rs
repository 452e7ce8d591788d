//! Domain-object lookup: which entry page documents an object

use ahash::AHashMap;
use parking_lot::RwLock;

use folio_core::model::ObjectMapping;
use folio_core::{ContentId, ObjectKey};

/// Index from documented objects to `(entry, page)`
#[derive(Debug, Default)]
pub struct ObjectIndex {
    mappings: RwLock<AHashMap<ObjectKey, (ContentId, usize)>>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one mapping; a later mapping for the same object wins
    pub fn insert(&self, object: ObjectKey, entry: ContentId, page: usize) {
        if let Some((previous, _)) = self.mappings.write().insert(object.clone(), (entry, page)) {
            tracing::debug!("Object {} was documented by {}, remapping", object, previous);
        }
    }

    pub fn extend(&self, mappings: impl IntoIterator<Item = ObjectMapping>) {
        for mapping in mappings {
            self.insert(mapping.object, mapping.entry, mapping.page);
        }
    }

    pub fn get(&self, object: &ObjectKey) -> Option<(ContentId, usize)> {
        self.mappings.read().get(object).cloned()
    }

    /// Look up by object spec, ignoring count and tag suffixes
    pub fn get_spec(&self, spec: &str) -> Option<(ContentId, usize)> {
        self.get(&ObjectKey::from_spec(spec)?)
    }

    pub fn len(&self) -> usize {
        self.mappings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.read().is_empty()
    }

    /// Clear the index
    pub fn clear(&self) {
        self.mappings.write().clear();
    }
}
