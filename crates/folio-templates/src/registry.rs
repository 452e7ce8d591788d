//! Addon template registry and per-book template sets

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use folio_core::{BookError, ContentId, ObjectKey, TemplateResolver};

use crate::factory::TemplateFactory;
use crate::template::Template;

/// Templates contributed by extensions, shared by every book.
///
/// Append-only while extensions register, read-only once frozen.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: RwLock<IndexMap<ContentId, TemplateFactory>>,
    frozen: AtomicBool,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: TemplateFactory) -> Result<(), BookError> {
        if self.is_frozen() {
            return Err(BookError::RegistryFrozen {
                registry: "template",
                key: factory.id().to_string(),
            });
        }
        let id = factory.id().clone();
        if self.templates.write().insert(id.clone(), factory).is_some() {
            tracing::debug!("Replacing addon template {}", id);
        }
        Ok(())
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.templates.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    /// Registered factories, in registration order
    pub fn snapshot(&self) -> Vec<TemplateFactory> {
        self.templates.read().values().cloned().collect()
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

/// Templates of one book: factories plus the instances built on first use
#[derive(Debug, Default)]
pub struct TemplateSet {
    factories: IndexMap<ContentId, TemplateFactory>,
    built: RwLock<AHashMap<ContentId, Arc<Template>>>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding every template of the addon registry
    pub fn seeded(addons: &TemplateRegistry) -> Self {
        let mut set = Self::new();
        set.seed(addons);
        set
    }

    pub fn seed(&mut self, addons: &TemplateRegistry) {
        for factory in addons.snapshot() {
            self.insert(factory);
        }
    }

    pub fn insert(&mut self, factory: TemplateFactory) {
        self.built.write().remove(factory.id());
        self.factories.insert(factory.id().clone(), factory);
    }

    pub fn clear(&mut self) {
        self.factories.clear();
        self.built.write().clear();
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.factories.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ContentId> {
        self.factories.keys()
    }

    /// Whether the template was already built for real use
    pub fn is_built(&self, id: &ContentId) -> bool {
        self.built.read().contains_key(id)
    }

    /// The template with this id, built on first request
    pub fn get(&self, id: &ContentId) -> Option<Result<Arc<Template>, BookError>> {
        if let Some(template) = self.built.read().get(id) {
            return Some(Ok(Arc::clone(template)));
        }
        let factory = self.factories.get(id)?;
        let template = match factory.instantiate() {
            Ok(template) => Arc::new(template),
            Err(e) => return Some(Err(e)),
        };
        self.built.write().insert(id.clone(), Arc::clone(&template));
        Some(Ok(template))
    }
}

impl TemplateResolver for TemplateSet {
    fn bind(&self, id: &ContentId, page: &Map<String, Value>) -> Option<Result<Vec<ObjectKey>, BookError>> {
        let template = self.get(id)?;
        Some(template.and_then(|t| t.bind(page)).map(|bound| bound.associated_objects()))
    }
}
