//! Discriminator-keyed registry of decodable content kinds
//!
//! Page payloads and template components carry a `type` field naming their
//! kind. A [`TypeRegistry`] maps that string to a decode function producing the
//! registry's value type. Registries are filled during bootstrap and are
//! expected to be read-only once [`TypeRegistry::freeze`] has been called.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::BookError;

/// Decode function for one registered kind
pub type Decoder<T> = Arc<dyn Fn(&Value) -> Result<T, serde_json::Error> + Send + Sync>;

/// Build a decoder that deserializes `K` and wraps it into the registry value
pub fn decoder<K, T>(wrap: fn(K) -> T) -> Decoder<T>
where
    K: DeserializeOwned + 'static,
    T: 'static,
{
    Arc::new(move |value: &Value| K::deserialize(value).map(wrap))
}

/// Registry mapping discriminators to decoders, with an optional fallback
pub struct TypeRegistry<T> {
    name: &'static str,
    kinds: RwLock<AHashMap<String, Decoder<T>>>,
    fallback: Option<Decoder<T>>,
    frozen: AtomicBool,
}

impl<T> TypeRegistry<T> {
    /// Registry where unknown discriminators resolve to nothing
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            kinds: RwLock::new(AHashMap::new()),
            fallback: None,
            frozen: AtomicBool::new(false),
        }
    }

    /// Registry where unknown discriminators resolve to `fallback`
    pub fn with_fallback(name: &'static str, fallback: Decoder<T>) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::new(name)
        }
    }

    /// Add built-in kinds while the registry is still exclusively owned
    pub fn with_kinds<'k>(mut self, kinds: impl IntoIterator<Item = (&'k str, Decoder<T>)>) -> Self {
        let map = self.kinds.get_mut();
        for (discriminator, decoder) in kinds {
            map.insert(discriminator.to_string(), decoder);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a kind; a later registration replaces an earlier one
    pub fn register(&self, discriminator: impl Into<String>, decoder: Decoder<T>) -> Result<(), BookError> {
        let discriminator = discriminator.into();
        if self.is_frozen() {
            return Err(BookError::RegistryFrozen {
                registry: self.name,
                key: discriminator,
            });
        }

        let previous = self.kinds.write().insert(discriminator.clone(), decoder);
        if previous.is_some() {
            tracing::debug!("Replacing {} kind '{}'", self.name, discriminator);
        }
        Ok(())
    }

    /// The decoder for `discriminator`, or the fallback when it is unknown
    pub fn resolve(&self, discriminator: &str) -> Option<Decoder<T>> {
        self.kinds
            .read()
            .get(discriminator)
            .cloned()
            .or_else(|| self.fallback.clone())
    }

    /// Whether `discriminator` was registered explicitly
    pub fn contains(&self, discriminator: &str) -> bool {
        self.kinds.read().contains_key(discriminator)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Registered discriminators, sorted
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// End the bootstrap phase; further registrations fail
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

impl<T> fmt::Debug for TypeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("name", &self.name)
            .field("kinds", &self.kinds())
            .field("fallback", &self.fallback.is_some())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
