//! Structured-document parsing
//!
//! Documents are JSON. Polymorphic fields (pages, template components) are
//! decoded through a [`TypeRegistry`] keyed by their `type` field, and the
//! original object is kept next to the typed value so fallback kinds can still
//! reach fields their schema does not model.

use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::{Category, CategoryDocument, Entry, EntryDocument, PageRegistry};
use crate::{BookError, ContentId, TypeRegistry};

/// Field holding the kind of a polymorphic payload
pub const DISCRIMINATOR: &str = "type";

/// A polymorphic value together with the payload it was decoded from
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub kind: String,
    pub value: T,
    pub source: Map<String, Value>,
}

/// Read a whole JSON document
pub fn read_document(id: &ContentId, reader: impl Read) -> Result<Value, BookError> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| BookError::malformed(id, e))?;
    if value.is_null() {
        return Err(BookError::malformed(id, "document is empty"));
    }
    Ok(value)
}

/// Decode a document into a concrete schema
pub fn decode<T: DeserializeOwned>(id: &ContentId, value: &Value) -> Result<T, BookError> {
    T::deserialize(value).map_err(|e| BookError::malformed(id, e))
}

/// Decode one polymorphic payload.
///
/// A missing discriminator is malformed. An unknown one yields `None` unless the
/// registry has a fallback kind.
pub fn decode_variant<T>(
    registry: &TypeRegistry<T>,
    origin: &str,
    value: &Value,
) -> Result<Option<Decoded<T>>, BookError> {
    let object = value
        .as_object()
        .ok_or_else(|| BookError::malformed(origin, "expected an object"))?;
    let kind = object
        .get(DISCRIMINATOR)
        .and_then(Value::as_str)
        .ok_or_else(|| BookError::malformed(origin, format!("missing '{}' field", DISCRIMINATOR)))?;

    let Some(decode) = registry.resolve(kind) else {
        tracing::debug!("Dropping {} of unknown {} kind '{}'", origin, registry.name(), kind);
        return Ok(None);
    };

    let value = decode(value).map_err(|e| BookError::malformed(origin, format!("{} '{}': {}", registry.name(), kind, e)))?;
    Ok(Some(Decoded {
        kind: kind.to_string(),
        value,
        source: object.clone(),
    }))
}

/// Decode a list of polymorphic payloads, dropping the ones that resolve to nothing
pub fn decode_variants<T>(
    registry: &TypeRegistry<T>,
    origin: &str,
    values: &[Value],
) -> Result<Vec<Decoded<T>>, BookError> {
    let mut decoded = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let item_origin = format!("{}[{}]", origin, idx);
        if let Some(item) = decode_variant(registry, &item_origin, value)? {
            decoded.push(item);
        }
    }
    Ok(decoded)
}

/// Parser for category and entry documents
#[derive(Debug, Clone)]
pub struct DocumentParser {
    pages: Arc<PageRegistry>,
}

impl DocumentParser {
    pub fn new(pages: Arc<PageRegistry>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Parse a category; unqualified ids inside it resolve in `namespace`
    pub fn parse_category(&self, id: ContentId, namespace: &str, reader: impl Read) -> Result<Category, BookError> {
        let value = read_document(&id, reader)?;
        let document: CategoryDocument = decode(&id, &value)?;
        Category::from_document(id, document, namespace)
    }

    /// Parse an entry and its pages; unqualified ids inside it resolve in `namespace`
    pub fn parse_entry(&self, id: ContentId, namespace: &str, reader: impl Read) -> Result<Entry, BookError> {
        let value = read_document(&id, reader)?;
        let document: EntryDocument = decode(&id, &value)?;
        let origin = format!("{} pages", id);
        let pages = decode_variants(&self.pages, &origin, &document.pages)?;
        Entry::from_document(id, document, pages, namespace)
    }
}
