//! Built-in component kinds

use std::any::Any;

use serde::Deserialize;

use folio_core::registry::{decoder, Decoder};
use folio_core::ObjectKey;

use crate::component::{ComponentRegistry, Placement, TemplateComponent};

macro_rules! component {
    ($($t:ty),* $(,)?) => {
        $(
            impl TemplateComponent for $t {
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

fn default_size() -> u32 {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeaderComponent {
    pub text: String,
    #[serde(default = "default_true")]
    pub centered: bool,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageComponent {
    pub image: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub u: u32,
    #[serde(default)]
    pub v: u32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeparatorComponent {
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameComponent {
    #[serde(flatten)]
    pub placement: Placement,
}

/// Hover area showing lines of text
#[derive(Debug, Clone, Deserialize)]
pub struct TooltipComponent {
    pub tooltip: Vec<String>,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityComponent {
    pub entity: String,
    #[serde(default = "default_scale")]
    pub render_size: f32,
    #[serde(default = "default_true")]
    pub rotate: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub placement: Placement,
}

component!(
    TextComponent,
    HeaderComponent,
    ImageComponent,
    SeparatorComponent,
    FrameComponent,
    TooltipComponent,
    EntityComponent,
);

/// A displayed object; linked items count as documented by the page
#[derive(Debug, Clone, Deserialize)]
pub struct ItemComponent {
    pub item: String,
    #[serde(default)]
    pub framed: bool,
    #[serde(default)]
    pub link_recipe: bool,
    #[serde(flatten)]
    pub placement: Placement,
}

impl TemplateComponent for ItemComponent {
    fn associated_objects(&self) -> Vec<ObjectKey> {
        if !self.link_recipe {
            return Vec::new();
        }
        ObjectKey::from_spec(&self.item).into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn boxed<C: TemplateComponent>(component: C) -> Box<dyn TemplateComponent> {
    Box::new(component)
}

/// Decoder for a component kind, for use with [`ComponentRegistry::register`]
pub fn component_decoder<C>() -> Decoder<Box<dyn TemplateComponent>>
where
    C: TemplateComponent + serde::de::DeserializeOwned,
{
    decoder::<C, Box<dyn TemplateComponent>>(boxed::<C>)
}

/// Registry holding every built-in component kind
pub fn component_registry() -> ComponentRegistry {
    let builtins: [(&str, Decoder<Box<dyn TemplateComponent>>); 8] = [
        ("text", component_decoder::<TextComponent>()),
        ("header", component_decoder::<HeaderComponent>()),
        ("image", component_decoder::<ImageComponent>()),
        ("item", component_decoder::<ItemComponent>()),
        ("separator", component_decoder::<SeparatorComponent>()),
        ("frame", component_decoder::<FrameComponent>()),
        ("tooltip", component_decoder::<TooltipComponent>()),
        ("entity", component_decoder::<EntityComponent>()),
    ];
    ComponentRegistry::new("component").with_kinds(builtins)
}
