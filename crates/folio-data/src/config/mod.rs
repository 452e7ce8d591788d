//! Loader configuration module

pub mod loader_config;

pub use loader_config::*;
