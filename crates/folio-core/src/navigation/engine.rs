//! Navigation engine implementation

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::{BookView, EntryView, LandingView, NavigationContext, NavigationSubscriber, ViewLocation};
use crate::{BookError, ContentId};

/// Navigation state stored internally
#[derive(Debug, Default)]
struct NavigationState {
    current: Option<Box<dyn BookView>>,
    /// Oldest first; the top of the stack is the last element
    back_stack: Vec<Box<dyn BookView>>,
    shown: bool,
}

impl NavigationState {
    fn current_or_landing(&mut self) -> &dyn BookView {
        &**self
            .current
            .get_or_insert_with(|| Box::new(LandingView) as Box<dyn BookView>)
    }
}

/// Current view and back-stack of one book.
///
/// The back-stack only changes through the operations below and never holds
/// the current view.
#[derive(Default)]
pub struct Navigator {
    state: RwLock<NavigationState>,
    subscribers: RwLock<Vec<Weak<dyn NavigationSubscriber>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the current view, starting at the landing page when
    /// nothing was opened yet
    pub fn current_location(&self) -> ViewLocation {
        self.state.write().current_or_landing().location()
    }

    /// Whether a current view has been set, without initializing one
    pub fn has_current_view(&self) -> bool {
        self.state.read().current.is_some()
    }

    /// Whether the book is on screen
    pub fn is_shown(&self) -> bool {
        self.state.read().shown
    }

    /// Back-stack locations, most recent first
    pub fn back_stack(&self) -> Vec<ViewLocation> {
        self.state.read().back_stack.iter().rev().map(|v| v.location()).collect()
    }

    pub fn depth(&self) -> usize {
        self.state.read().back_stack.len()
    }

    /// Display `view` if it can be opened. With `push`, a different view
    /// already on screen goes onto the back-stack first.
    pub fn open(&self, mut view: Box<dyn BookView>, push: bool, ctx: &NavigationContext<'_>) -> bool {
        if !view.can_be_opened(ctx) {
            tracing::debug!("Refusing to open {}", view.location());
            return false;
        }

        let location = view.location();
        view.on_first_opened(ctx);

        let mut state = self.state.write();
        let previous = state.current.take();
        if let Some(previous) = previous {
            if push && state.shown && previous.location() != location {
                state.back_stack.push(previous);
            }
        }
        state.current = Some(view);
        state.shown = true;
        drop(state);

        self.notify_subscribers(&location);
        true
    }

    /// Put the current view on screen without touching the back-stack
    pub fn show(&self, ctx: &NavigationContext<'_>) -> bool {
        let view = {
            let mut state = self.state.write();
            state.current_or_landing();
            state.current.take()
        };
        let Some(view) = view else {
            return false;
        };
        if !view.can_be_opened(ctx) {
            self.state.write().current = Some(view);
            return false;
        }
        self.open(view, false, ctx)
    }

    /// Make `page` of `entry` the view shown next time the book opens.
    ///
    /// Locked entries are ignored. Asking for the spread already current is a
    /// no-op; otherwise the previous view goes onto the back-stack.
    pub fn set_top_entry(&self, entry: &ContentId, page: usize, ctx: &NavigationContext<'_>) -> Result<(), BookError> {
        let found = ctx
            .graph
            .entry(entry)
            .ok_or_else(|| BookError::UnknownEntry(entry.clone()))?;
        if found.is_locked(ctx.environment) {
            tracing::debug!("Not moving to locked entry {}", entry);
            return Ok(());
        }

        let view = EntryView::at_page(entry.clone(), page);
        let location = view.location();

        let mut state = self.state.write();
        if state.current_or_landing().location() == location {
            return Ok(());
        }
        if let Some(previous) = state.current.take() {
            state.back_stack.push(previous);
        }
        state.current = Some(Box::new(view));
        drop(state);

        self.notify_subscribers(&location);
        Ok(())
    }

    /// Forget all navigation when the current view can no longer be opened.
    /// Returns whether anything was reset.
    pub fn check_valid_current_entry(&self, ctx: &NavigationContext<'_>) -> bool {
        let mut state = self.state.write();
        if state.current_or_landing().can_be_opened(ctx) {
            return false;
        }
        tracing::debug!("Current view vanished, clearing {} history views", state.back_stack.len());
        state.current = None;
        state.back_stack.clear();
        true
    }

    /// Return to the most recent view of the back-stack. A view that can no
    /// longer be opened is discarded and `false` is returned.
    pub fn back(&self, ctx: &NavigationContext<'_>) -> bool {
        let Some(view) = self.state.write().back_stack.pop() else {
            return false;
        };
        self.open(view, false, ctx)
    }

    /// Hide the book, keeping its current view for the next opening
    pub fn close(&self) {
        self.state.write().shown = false;
    }

    /// Forget the current view and the whole back-stack
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.current = None;
        state.back_stack.clear();
        state.shown = false;
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: &Arc<dyn NavigationSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(subscriber));
    }

    /// Subscribers may call back into the navigator, so no lock is held
    /// while they run
    fn notify_subscribers(&self, location: &ViewLocation) {
        let live: Vec<Arc<dyn NavigationSubscriber>> = {
            let mut subscribers = self.subscribers.write();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for subscriber in live {
            subscriber.on_view_change(location);
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Navigator")
            .field("current", &state.current.as_ref().map(|v| v.location()))
            .field("back_stack", &state.back_stack.len())
            .field("shown", &state.shown)
            .finish()
    }
}
