//! Polymorphic pages

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

use super::BookGraph;
use crate::{BookError, ContentId, Decoded, ObjectKey, TypeRegistry};

/// Concrete data of one page kind
pub trait PageContent: fmt::Debug + Send + Sync + Any {
    /// Validate the page once the graph is linked, returning the domain
    /// objects this page documents
    fn build(&self, _ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn Any;
}

pub type PageRegistry = TypeRegistry<Box<dyn PageContent>>;

/// Template lookup available to pages while they build
pub trait TemplateResolver {
    /// Bind template `id` against a page payload and return the objects the
    /// bound template documents; `None` when no such template exists
    fn bind(&self, id: &ContentId, page: &Map<String, Value>) -> Option<Result<Vec<ObjectKey>, BookError>>;
}

/// Resolver that knows no templates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplates;

impl TemplateResolver for NoTemplates {
    fn bind(&self, _id: &ContentId, _page: &Map<String, Value>) -> Option<Result<Vec<ObjectKey>, BookError>> {
        None
    }
}

/// Everything a page may consult while building
pub struct PageBuildContext<'a> {
    pub namespace: &'a str,
    pub entry: &'a ContentId,
    pub page: usize,
    pub source: &'a Map<String, Value>,
    pub graph: &'a BookGraph,
    pub templates: &'a dyn TemplateResolver,
}

/// One page of an entry
#[derive(Debug)]
pub struct Page {
    kind: String,
    content: Box<dyn PageContent>,
    source: Map<String, Value>,
}

impl Page {
    pub fn new(kind: impl Into<String>, content: Box<dyn PageContent>, source: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            content,
            source,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn content(&self) -> &dyn PageContent {
        self.content.as_ref()
    }

    pub fn downcast<P: PageContent>(&self) -> Option<&P> {
        self.content.as_any().downcast_ref::<P>()
    }

    /// The payload the page was decoded from
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.source.get(key)
    }
}

impl From<Decoded<Box<dyn PageContent>>> for Page {
    fn from(decoded: Decoded<Box<dyn PageContent>>) -> Self {
        Self::new(decoded.kind, decoded.value, decoded.source)
    }
}
