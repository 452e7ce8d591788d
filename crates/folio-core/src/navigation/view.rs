//! Views the navigator can display

use std::fmt;

use super::{NavigationContext, ViewLocation};
use crate::ContentId;

/// A displayable view. Rendering is up to the presentation layer; the
/// navigator only asks where the view is and whether it may be opened.
pub trait BookView: fmt::Debug + Send + Sync {
    fn location(&self) -> ViewLocation;

    /// Precondition for displaying the view against the current graph
    fn can_be_opened(&self, ctx: &NavigationContext<'_>) -> bool;

    /// Hook run each time the view is opened
    fn on_first_opened(&mut self, _ctx: &NavigationContext<'_>) {}
}

/// Landing page; always available
#[derive(Debug, Clone, Copy, Default)]
pub struct LandingView;

impl BookView for LandingView {
    fn location(&self) -> ViewLocation {
        ViewLocation::Landing
    }

    fn can_be_opened(&self, _ctx: &NavigationContext<'_>) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct CategoryView {
    category: ContentId,
}

impl CategoryView {
    pub fn new(category: ContentId) -> Self {
        Self { category }
    }

    pub fn category(&self) -> &ContentId {
        &self.category
    }
}

impl BookView for CategoryView {
    fn location(&self) -> ViewLocation {
        ViewLocation::Category(self.category.clone())
    }

    fn can_be_opened(&self, ctx: &NavigationContext<'_>) -> bool {
        ctx.graph.category(&self.category).is_some()
            && !ctx.graph.is_category_locked(&self.category, ctx.environment)
    }
}

/// One spread of an entry. Opening it marks the spread as seen.
#[derive(Debug, Clone)]
pub struct EntryView {
    entry: ContentId,
    spread: usize,
}

impl EntryView {
    pub fn new(entry: ContentId, spread: usize) -> Self {
        Self { entry, spread }
    }

    /// View of the spread holding `page`; pages are shown two-up
    pub fn at_page(entry: ContentId, page: usize) -> Self {
        Self::new(entry, page / 2)
    }

    pub fn entry(&self) -> &ContentId {
        &self.entry
    }

    pub fn spread(&self) -> usize {
        self.spread
    }
}

impl BookView for EntryView {
    fn location(&self) -> ViewLocation {
        ViewLocation::Entry {
            entry: self.entry.clone(),
            spread: self.spread,
        }
    }

    fn can_be_opened(&self, ctx: &NavigationContext<'_>) -> bool {
        ctx.graph
            .entry(&self.entry)
            .map_or(false, |entry| !entry.is_locked(ctx.environment))
    }

    fn on_first_opened(&mut self, ctx: &NavigationContext<'_>) {
        ctx.reads.record_spread(&self.entry, self.spread);
    }
}
