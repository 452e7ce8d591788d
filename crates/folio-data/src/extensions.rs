//! Extension registration: page kinds, component kinds and addon templates

use std::sync::Arc;

use folio_core::model::pages::{page_decoder, page_registry};
use folio_core::{BookError, ContentId, Decoder, DocumentParser, PageContent, PageRegistry};
use folio_templates::{component_registry, ComponentRegistry, TemplateComponent, TemplateFactory, TemplateRegistry};

/// Registries shared by every book of a library.
///
/// Extensions register during bootstrap; [`Extensions::freeze`] ends that
/// phase and every later registration fails.
#[derive(Debug, Clone)]
pub struct Extensions {
    pages: Arc<PageRegistry>,
    components: Arc<ComponentRegistry>,
    templates: Arc<TemplateRegistry>,
}

impl Default for Extensions {
    fn default() -> Self {
        Self::new()
    }
}

impl Extensions {
    /// Registries seeded with the built-in page and component kinds
    pub fn new() -> Self {
        Self {
            pages: Arc::new(page_registry()),
            components: Arc::new(component_registry()),
            templates: Arc::new(TemplateRegistry::new()),
        }
    }

    pub fn register_page_type(&self, kind: &str, decoder: Decoder<Box<dyn PageContent>>) -> Result<(), BookError> {
        self.pages.register(kind, decoder)
    }

    /// Register a page kind decoded straight from its payload
    pub fn register_page<P>(&self, kind: &str) -> Result<(), BookError>
    where
        P: PageContent + serde::de::DeserializeOwned,
    {
        self.register_page_type(kind, page_decoder::<P>())
    }

    pub fn register_template_component_type(
        &self,
        kind: &str,
        decoder: Decoder<Box<dyn TemplateComponent>>,
    ) -> Result<(), BookError> {
        self.components.register(kind, decoder)
    }

    pub fn register_template_factory(&self, factory: TemplateFactory) -> Result<(), BookError> {
        self.templates.register(factory)
    }

    /// Register an addon template given as a JSON document
    pub fn register_template_json(&self, id: ContentId, json: impl Into<String>) -> Result<(), BookError> {
        let factory = TemplateFactory::from_json(id, json, Arc::clone(&self.components));
        self.register_template_factory(factory)
    }

    pub fn freeze(&self) {
        self.pages.freeze();
        self.components.freeze();
        self.templates.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.pages.is_frozen() && self.components.is_frozen() && self.templates.is_frozen()
    }

    pub fn parser(&self) -> DocumentParser {
        DocumentParser::new(Arc::clone(&self.pages))
    }

    pub fn pages(&self) -> &Arc<PageRegistry> {
        &self.pages
    }

    pub fn components(&self) -> &Arc<ComponentRegistry> {
        &self.components
    }

    pub fn templates(&self) -> &Arc<TemplateRegistry> {
        &self.templates
    }
}
