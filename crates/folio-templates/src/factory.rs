//! Deferred template construction

use std::fmt;
use std::sync::Arc;

use folio_core::{BookError, ContentId};

use crate::component::ComponentRegistry;
use crate::template::Template;

type Build = Arc<dyn Fn() -> Result<Template, BookError> + Send + Sync>;

/// Builds a template on demand. Loading stores the factory, not the
/// template; [`TemplateFactory::smoke_test`] surfaces construction errors
/// early by building once and discarding the result.
#[derive(Clone)]
pub struct TemplateFactory {
    id: ContentId,
    build: Build,
}

impl TemplateFactory {
    pub fn new<F>(id: ContentId, build: F) -> Self
    where
        F: Fn() -> Result<Template, BookError> + Send + Sync + 'static,
    {
        Self {
            id,
            build: Arc::new(build),
        }
    }

    /// Factory re-parsing a JSON document on every construction
    pub fn from_json(id: ContentId, json: impl Into<String>, registry: Arc<ComponentRegistry>) -> Self {
        let json: String = json.into();
        let template_id = id.clone();
        Self::new(id, move || {
            Template::parse(template_id.clone(), json.as_bytes(), Arc::clone(&registry))
        })
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn instantiate(&self) -> Result<Template, BookError> {
        (self.build)()
    }

    /// Build once and discard, reporting failures as construction errors
    pub fn smoke_test(&self) -> Result<(), BookError> {
        match self.instantiate() {
            Ok(_) => Ok(()),
            Err(BookError::Construction { template, reason }) => Err(BookError::Construction { template, reason }),
            Err(e) => Err(BookError::Construction {
                template: self.id.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

impl fmt::Debug for TemplateFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFactory").field("id", &self.id).finish()
    }
}
