//! Locale substitution with fallback to the default locale

use std::io::Read;

use folio_core::{BookError, ContentId};

use crate::sources::{ContentReader, ContentStore};

/// Maps default-locale ids to a target locale and loads them, falling back
/// to the default-locale file when no override exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationResolver {
    default_locale: String,
    target_locale: String,
}

impl LocalizationResolver {
    pub fn new(default_locale: impl Into<String>, target_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            target_locale: target_locale.into(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn target_locale(&self) -> &str {
        &self.target_locale
    }

    /// The target-locale id of a canonical one: its first path segment equal
    /// to the default locale is replaced
    pub fn localized_id(&self, canonical: &ContentId) -> ContentId {
        let mut replaced = false;
        let path: Vec<&str> = canonical
            .segments()
            .map(|segment| {
                if !replaced && segment == self.default_locale {
                    replaced = true;
                    self.target_locale.as_str()
                } else {
                    segment
                }
            })
            .collect();
        if !replaced {
            return canonical.clone();
        }
        canonical
            .with_path(path.join("/"))
            .unwrap_or_else(|_| canonical.clone())
    }

    /// Open the localized file, else the canonical one
    pub fn load_localized<'s>(
        &self,
        store: &'s dyn ContentStore,
        canonical: &ContentId,
    ) -> Result<ContentReader<'s>, BookError> {
        let localized = self.localized_id(canonical);
        if localized != *canonical {
            if let Some(reader) = store.open(&localized)? {
                return Ok(reader);
            }
            tracing::warn!("Failed to load {}. Switching to fallback.", localized);
        }
        store
            .open(canonical)?
            .ok_or_else(|| BookError::ContentNotFound(canonical.clone()))
    }

    /// Like [`LocalizationResolver::load_localized`], read to a string
    pub fn read_localized(&self, store: &dyn ContentStore, canonical: &ContentId) -> Result<String, BookError> {
        let mut reader = self.load_localized(store, canonical)?;
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(body)
    }
}
