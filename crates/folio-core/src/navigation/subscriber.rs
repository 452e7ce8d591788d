//! Navigation subscriber trait

use super::ViewLocation;

/// Trait for components that follow what the book displays
pub trait NavigationSubscriber: Send + Sync {
    /// Called after the current view changes
    fn on_view_change(&self, location: &ViewLocation);
}
