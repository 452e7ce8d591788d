//! Template system for composed pages
//!
//! Pages whose kind is not built in name a template. A template is a list of
//! components; binding it against a page payload substitutes `#key`
//! variables with the page's fields before the components are decoded.

pub mod component;
pub mod components;
pub mod factory;
pub mod registry;
pub mod template;

pub use component::{ComponentRegistry, Placement, TemplateComponent};
pub use components::component_registry;
pub use factory::TemplateFactory;
pub use registry::{TemplateRegistry, TemplateSet};
pub use template::{bind_variables, Template};
