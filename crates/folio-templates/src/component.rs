//! Template components

use std::any::Any;
use std::fmt;

use serde::Deserialize;

use folio_core::{ObjectKey, TypeRegistry};

/// One building block of a template
pub trait TemplateComponent: fmt::Debug + Send + Sync + Any {
    /// Domain objects this component documents once bound
    fn associated_objects(&self) -> Vec<ObjectKey> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

/// Component kinds by discriminator. Has no fallback: components of an
/// unknown kind are dropped.
pub type ComponentRegistry = TypeRegistry<Box<dyn TemplateComponent>>;

/// Position of a component on its page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}
