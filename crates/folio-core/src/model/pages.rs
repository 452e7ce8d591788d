//! Built-in page kinds
//!
//! These model the fields each kind declares. Drawing them is left to the
//! presentation layer.

use std::any::Any;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::{PageBuildContext, PageContent, PageRegistry};
use crate::registry::{decoder, Decoder};
use crate::{BookError, ContentId, ObjectKey};

macro_rules! page_content {
    ($($t:ty),* $(,)?) => {
        $(
            impl PageContent for $t {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextPage {
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmptyPage {
    #[serde(default = "default_true")]
    pub draw_filler: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagePage {
    pub images: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub border: bool,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkPage {
    #[serde(default)]
    pub text: Option<String>,
    pub url: String,
    pub link_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityPage {
    pub entity: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub offset: f32,
    #[serde(default = "default_true")]
    pub rotate: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestPage {
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

page_content!(TextPage, EmptyPage, ImagePage, LinkPage, EntityPage, QuestPage);

/// Page showcasing a single object
#[derive(Debug, Clone, Deserialize)]
pub struct SpotlightPage {
    pub item: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link_recipe: bool,
    #[serde(default)]
    pub text: Option<String>,
}

impl PageContent for SpotlightPage {
    fn build(&self, _ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        if !self.link_recipe {
            return Ok(Vec::new());
        }
        Ok(ObjectKey::from_spec(&self.item).into_iter().collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Page showing one or two recipes; used for both crafting and smelting
#[derive(Debug, Clone, Deserialize)]
pub struct RecipePage {
    pub recipe: String,
    #[serde(default)]
    pub recipe2: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl PageContent for RecipePage {
    fn build(&self, _ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        Ok(std::iter::once(self.recipe.as_str())
            .chain(self.recipe2.as_deref())
            .filter_map(ObjectKey::from_spec)
            .collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Page listing related entries
#[derive(Debug, Clone, Deserialize)]
pub struct RelationsPage {
    pub entries: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl PageContent for RelationsPage {
    fn build(&self, ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        for raw in &self.entries {
            let id = ContentId::parse_in(raw, ctx.namespace)?;
            if ctx.graph.entry(&id).is_none() {
                tracing::debug!("Entry {} page {} relates to absent entry {}", ctx.entry, ctx.page, id);
            }
        }
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Page showing a multi-part structure, by reference or inline
#[derive(Debug, Clone, Deserialize)]
pub struct MultiblockPage {
    pub name: String,
    #[serde(default)]
    pub multiblock_id: Option<String>,
    #[serde(default)]
    pub multiblock: Option<Value>,
    #[serde(default = "default_true")]
    pub enable_visualize: bool,
    #[serde(default)]
    pub text: Option<String>,
}

impl PageContent for MultiblockPage {
    fn build(&self, ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        if self.multiblock_id.is_none() && self.multiblock.is_none() {
            return Err(BookError::malformed(
                format!("{} page {}", ctx.entry, ctx.page),
                "multiblock page needs either 'multiblock_id' or 'multiblock'",
            ));
        }
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fallback for unknown kinds: the discriminator names a template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePage {
    #[serde(rename = "type")]
    pub template: String,
}

impl PageContent for TemplatePage {
    fn build(&self, ctx: &PageBuildContext<'_>) -> Result<Vec<ObjectKey>, BookError> {
        let id = ContentId::parse_in(&self.template, ctx.namespace)?;
        match ctx.templates.bind(&id, ctx.source) {
            Some(objects) => objects,
            None => Err(BookError::UnknownTemplate(id)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn boxed<P: PageContent>(page: P) -> Box<dyn PageContent> {
    Box::new(page)
}

/// Decoder for a page kind, for use with [`PageRegistry::register`]
pub fn page_decoder<P>() -> Decoder<Box<dyn PageContent>>
where
    P: PageContent + serde::de::DeserializeOwned,
{
    decoder::<P, Box<dyn PageContent>>(boxed::<P>)
}

/// Registry holding every built-in kind, falling back to template pages
pub fn page_registry() -> PageRegistry {
    let fallback: Decoder<Box<dyn PageContent>> = Arc::new(|value: &Value| {
        TemplatePage::deserialize(value).map(boxed)
    });
    let builtins: [(&str, Decoder<Box<dyn PageContent>>); 11] = [
        ("text", page_decoder::<TextPage>()),
        ("crafting", page_decoder::<RecipePage>()),
        ("smelting", page_decoder::<RecipePage>()),
        ("image", page_decoder::<ImagePage>()),
        ("spotlight", page_decoder::<SpotlightPage>()),
        ("empty", page_decoder::<EmptyPage>()),
        ("multiblock", page_decoder::<MultiblockPage>()),
        ("link", page_decoder::<LinkPage>()),
        ("relations", page_decoder::<RelationsPage>()),
        ("entity", page_decoder::<EntityPage>()),
        ("quest", page_decoder::<QuestPage>()),
    ];
    PageRegistry::with_fallback("page", fallback).with_kinds(builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookGraph, NoTemplates};
    use serde_json::{json, Map};

    fn build(page: &dyn PageContent) -> Result<Vec<ObjectKey>, BookError> {
        let graph = BookGraph::new();
        let entry: ContentId = "folio:entry".parse().unwrap();
        let source = Map::new();
        let ctx = PageBuildContext {
            namespace: "folio",
            entry: &entry,
            page: 0,
            source: &source,
            graph: &graph,
            templates: &NoTemplates,
        };
        page.build(&ctx)
    }

    #[test]
    fn test_builtin_kinds_registered() {
        let registry = page_registry();
        for kind in ["text", "crafting", "smelting", "spotlight", "relations", "quest"] {
            assert!(registry.contains(kind), "missing {}", kind);
        }
        assert!(registry.has_fallback());
    }

    #[test]
    fn test_spotlight_associations() {
        let linked: SpotlightPage = serde_json::from_value(json!({"item": "game:gear#2", "link_recipe": true})).unwrap();
        assert_eq!(build(&linked).unwrap(), vec![ObjectKey::from_spec("game:gear").unwrap()]);

        let plain: SpotlightPage = serde_json::from_value(json!({"item": "game:gear"})).unwrap();
        assert!(build(&plain).unwrap().is_empty());
    }

    #[test]
    fn test_recipe_associations() {
        let page: RecipePage = serde_json::from_value(json!({"recipe": "game:gear", "recipe2": "game:axle"})).unwrap();
        assert_eq!(build(&page).unwrap().len(), 2);
    }

    #[test]
    fn test_multiblock_requires_structure() {
        let page: MultiblockPage = serde_json::from_value(json!({"name": "Tower"})).unwrap();
        assert!(matches!(build(&page), Err(BookError::MalformedDocument { .. })));
    }

    #[test]
    fn test_template_page_without_template() {
        let page = TemplatePage { template: "custom".into() };
        match build(&page) {
            Err(BookError::UnknownTemplate(id)) => assert_eq!(id.to_string(), "folio:custom"),
            other => panic!("expected UnknownTemplate, got {:?}", other),
        }
    }
}
