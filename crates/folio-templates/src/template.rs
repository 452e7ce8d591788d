//! Templates and variable binding

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use folio_core::document::{decode, decode_variant, read_document};
use folio_core::{BookError, ContentId, Decoded, ObjectKey, DISCRIMINATOR};

use crate::component::{ComponentRegistry, TemplateComponent};

const VARIABLE_PREFIX: char = '#';

#[derive(Debug, Deserialize)]
struct TemplateDocument {
    #[serde(default)]
    components: Vec<Value>,
}

/// A parsed template.
///
/// Components holding `#key` variables are kept raw until the template is
/// bound to a page; the others are decoded right away.
pub struct Template {
    id: ContentId,
    raw: Vec<Value>,
    components: Vec<Decoded<Box<dyn TemplateComponent>>>,
    registry: Arc<ComponentRegistry>,
}

impl Template {
    pub fn parse(id: ContentId, reader: impl Read, registry: Arc<ComponentRegistry>) -> Result<Self, BookError> {
        let value = read_document(&id, reader)?;
        Self::from_value(id, &value, registry)
    }

    pub fn from_value(id: ContentId, value: &Value, registry: Arc<ComponentRegistry>) -> Result<Self, BookError> {
        let document: TemplateDocument = decode(&id, value)?;
        let mut components = Vec::new();
        for (idx, raw) in document.components.iter().enumerate() {
            let origin = format!("{} component {}", id, idx);
            if !raw.get(DISCRIMINATOR).map_or(false, Value::is_string) {
                return Err(BookError::malformed(origin, format!("missing '{}' field", DISCRIMINATOR)));
            }
            if has_variables(raw) {
                continue;
            }
            if let Some(component) = decode_variant(&registry, &origin, raw)? {
                components.push(component);
            }
        }

        Ok(Self {
            id,
            raw: document.components,
            components,
            registry,
        })
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    /// Decoded components; unbound templates omit those holding variables
    pub fn components(&self) -> &[Decoded<Box<dyn TemplateComponent>>] {
        &self.components
    }

    pub fn component<C: TemplateComponent>(&self, idx: usize) -> Option<&C> {
        self.components.get(idx)?.value.as_any().downcast_ref::<C>()
    }

    /// Whether any component still waits for variables
    pub fn is_bound(&self) -> bool {
        !self.raw.iter().any(has_variables)
    }

    /// Substitute the page's fields into every component and decode all of
    /// them. Components of unknown kinds are dropped.
    pub fn bind(&self, page: &Map<String, Value>) -> Result<Template, BookError> {
        let raw: Vec<Value> = self.raw.iter().map(|c| bind_variables(c, page)).collect();
        let mut components = Vec::with_capacity(raw.len());
        for (idx, component) in raw.iter().enumerate() {
            let origin = format!("{} component {}", self.id, idx);
            if let Some(decoded) = decode_variant(&self.registry, &origin, component)? {
                components.push(decoded);
            }
        }

        Ok(Template {
            id: self.id.clone(),
            raw,
            components,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Objects documented by the decoded components
    pub fn associated_objects(&self) -> Vec<ObjectKey> {
        self.components
            .iter()
            .flat_map(|c| c.value.associated_objects())
            .collect()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.id)
            .field("components", &self.components.len())
            .field("raw", &self.raw.len())
            .finish()
    }
}

fn is_variable(s: &str) -> bool {
    s.starts_with(VARIABLE_PREFIX) && !s.starts_with("##")
}

fn has_variables(value: &Value) -> bool {
    match value {
        Value::String(s) => is_variable(s),
        Value::Array(items) => items.iter().any(has_variables),
        Value::Object(fields) => fields.values().any(has_variables),
        _ => false,
    }
}

/// Replace every `"#key"` string with field `key` of `page`.
///
/// `"##text"` stands for the literal `"#text"`. A variable the page does not
/// define becomes an empty string.
pub fn bind_variables(value: &Value, page: &Map<String, Value>) -> Value {
    match value {
        Value::String(s) if s.starts_with("##") => Value::String(s[1..].to_string()),
        Value::String(s) if is_variable(s) => {
            let key = &s[1..];
            match page.get(key) {
                Some(bound) => bound.clone(),
                None => {
                    tracing::debug!("Page defines no value for template variable '{}'", key);
                    Value::String(String::new())
                }
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| bind_variables(v, page)).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), bind_variables(v, page)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{component_registry, HeaderComponent, ImageComponent, ItemComponent};
    use serde_json::json;

    fn id(raw: &str) -> ContentId {
        raw.parse().unwrap()
    }

    fn page(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("page must be an object"),
        }
    }

    #[test]
    fn test_bind_variables() {
        let page = page(json!({"title": "Gears", "size": 32, "tags": ["a"]}));
        let bound = bind_variables(
            &json!({"text": "#title", "width": "#size", "list": ["#tags", "##raw"], "missing": "#nope", "plain": "x"}),
            &page,
        );
        assert_eq!(
            bound,
            json!({"text": "Gears", "width": 32, "list": [["a"], "#raw"], "missing": "", "plain": "x"})
        );
    }

    #[test]
    fn test_unknown_component_dropped() {
        let template = Template::from_value(
            id("folio:card"),
            &json!({"components": [
                {"type": "header", "text": "Title"},
                {"type": "hologram", "intensity": 3},
                {"type": "separator"}
            ]}),
            Arc::new(component_registry()),
        )
        .unwrap();
        assert_eq!(template.components().len(), 2);
        assert_eq!(template.components()[1].kind, "separator");
    }

    #[test]
    fn test_component_without_kind_is_malformed() {
        let err = Template::from_value(
            id("folio:card"),
            &json!({"components": [{"text": "Title"}]}),
            Arc::new(component_registry()),
        )
        .unwrap_err();
        assert!(matches!(err, BookError::MalformedDocument { .. }));
    }

    #[test]
    fn test_variables_wait_for_binding() {
        let template = Template::from_value(
            id("folio:card"),
            &json!({"components": [
                {"type": "header", "text": "#title"},
                {"type": "image", "image": "folio:textures/frame.png", "width": "#w", "height": 16},
                {"type": "item", "item": "#item", "link_recipe": true}
            ]}),
            Arc::new(component_registry()),
        )
        .unwrap();
        assert!(!template.is_bound());
        assert!(template.components().is_empty());

        let bound = template
            .bind(&page(json!({"title": "Gears", "w": 48, "item": "game:gear"})))
            .unwrap();
        assert!(bound.is_bound());
        assert_eq!(bound.component::<HeaderComponent>(0).unwrap().text, "Gears");
        assert_eq!(bound.component::<ImageComponent>(1).unwrap().width, 48);
        assert_eq!(bound.component::<ItemComponent>(2).unwrap().item, "game:gear");
        assert_eq!(bound.associated_objects(), vec![ObjectKey::from_spec("game:gear").unwrap()]);
    }

    #[test]
    fn test_bad_binding_is_malformed() {
        let template = Template::from_value(
            id("folio:card"),
            &json!({"components": [{"type": "image", "image": "x.png", "width": "#w", "height": 1}]}),
            Arc::new(component_registry()),
        )
        .unwrap();
        assert!(template.bind(&page(json!({"w": "wide"}))).is_err());
    }
}
