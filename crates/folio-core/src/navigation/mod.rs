//! View stack of one book: the current view, its history and the views
//! the engine knows how to build

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::model::BookGraph;
use crate::read_state::ReadTracker;
use crate::ContentId;

mod engine;
mod subscriber;
mod view;

pub use engine::Navigator;
pub use subscriber::NavigationSubscriber;
pub use view::{BookView, CategoryView, EntryView, LandingView};

/// Logical identity of a view. Two views at the same location are the same
/// view as far as the back-stack is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewLocation {
    /// The book's landing page
    Landing,
    Category(ContentId),
    /// An entry shown at a two-page spread
    Entry { entry: ContentId, spread: usize },
    /// A view supplied by the presentation layer
    Custom(String),
}

impl ViewLocation {
    pub fn entry(&self) -> Option<&ContentId> {
        match self {
            ViewLocation::Entry { entry, .. } => Some(entry),
            _ => None,
        }
    }
}

impl fmt::Display for ViewLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewLocation::Landing => write!(f, "landing"),
            ViewLocation::Category(id) => write!(f, "category {}", id),
            ViewLocation::Entry { entry, spread } => write!(f, "entry {} (spread {})", entry, spread),
            ViewLocation::Custom(name) => write!(f, "custom {}", name),
        }
    }
}

/// Everything views consult to decide whether they can be opened
#[derive(Clone, Copy)]
pub struct NavigationContext<'a> {
    pub graph: &'a BookGraph,
    pub environment: &'a dyn Environment,
    pub reads: &'a ReadTracker,
}

impl<'a> NavigationContext<'a> {
    pub fn new(graph: &'a BookGraph, environment: &'a dyn Environment, reads: &'a ReadTracker) -> Self {
        Self {
            graph,
            environment,
            reads,
        }
    }
}
