//! Read/unread tracking and its rollup through the category hierarchy

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::environment::Environment;
use crate::model::{BookGraph, Entry};
use crate::ContentId;

/// Tri-state read marker. Ordered by how much attention it needs, so the
/// rollup of a set of states is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadState {
    Read,
    PartiallyRead,
    Unread,
}

impl ReadState {
    /// The most attention-worthy state of a set; an empty set is Read
    pub fn most_important(states: impl IntoIterator<Item = ReadState>) -> ReadState {
        states.into_iter().max().unwrap_or(ReadState::Read)
    }
}

/// A node of the graph whose read-state can be asked for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadNode {
    Book,
    Category(ContentId),
    Entry(ContentId),
}

/// Seen-spread log plus a memo of computed states.
///
/// The memo lives for one reload cycle: callers invalidate it on reload and
/// on lock changes. Recording a spread invalidates it automatically.
#[derive(Debug, Default)]
pub struct ReadTracker {
    seen: RwLock<AHashMap<ContentId, usize>>,
    memo: RwLock<AHashMap<ReadNode, ReadState>>,
}

impl ReadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `spread` of `entry` was displayed
    pub fn record_spread(&self, entry: &ContentId, spread: usize) {
        let mut seen = self.seen.write();
        let highest = seen.entry(entry.clone()).or_insert(spread);
        if spread > *highest {
            *highest = spread;
        }
        drop(seen);
        self.invalidate();
    }

    /// Record every spread of `entry` as seen
    pub fn mark_read(&self, entry: &Entry) {
        self.record_spread(entry.id(), entry.spread_count() - 1);
    }

    pub fn highest_spread(&self, entry: &ContentId) -> Option<usize> {
        self.seen.read().get(entry).copied()
    }

    /// Drop memoized states; the seen-log is kept
    pub fn invalidate(&self) {
        self.memo.write().clear();
    }

    /// Forget the seen-log as well
    pub fn clear(&self) {
        self.seen.write().clear();
        self.invalidate();
    }

    pub fn state(&self, node: &ReadNode, graph: &BookGraph, environment: &dyn Environment) -> ReadState {
        if let Some(state) = self.memo.read().get(node) {
            return *state;
        }

        let state = match node {
            ReadNode::Book => ReadState::most_important(
                graph
                    .root_categories()
                    .map(|c| self.state(&ReadNode::Category(c.id().clone()), graph, environment)),
            ),
            ReadNode::Category(id) => match graph.category(id) {
                Some(category) => {
                    let entries = graph
                        .entries_in(category)
                        .map(|e| self.state(&ReadNode::Entry(e.id().clone()), graph, environment));
                    let children = category
                        .children()
                        .iter()
                        .map(|c| self.state(&ReadNode::Category(c.clone()), graph, environment));
                    ReadState::most_important(entries.chain(children))
                }
                None => ReadState::Read,
            },
            ReadNode::Entry(id) => match graph.entry(id) {
                Some(entry) => self.compute_entry(entry, environment),
                None => ReadState::Read,
            },
        };

        self.memo.write().insert(node.clone(), state);
        state
    }

    pub fn book_state(&self, graph: &BookGraph, environment: &dyn Environment) -> ReadState {
        self.state(&ReadNode::Book, graph, environment)
    }

    pub fn category_state(&self, id: &ContentId, graph: &BookGraph, environment: &dyn Environment) -> ReadState {
        self.state(&ReadNode::Category(id.clone()), graph, environment)
    }

    pub fn entry_state(&self, id: &ContentId, graph: &BookGraph, environment: &dyn Environment) -> ReadState {
        self.state(&ReadNode::Entry(id.clone()), graph, environment)
    }

    fn compute_entry(&self, entry: &Entry, environment: &dyn Environment) -> ReadState {
        if entry.is_read_by_default() || entry.is_locked(environment) {
            return ReadState::Read;
        }
        match self.highest_spread(entry.id()) {
            Some(highest) if highest + 1 >= entry.spread_count() => ReadState::Read,
            Some(_) => ReadState::PartiallyRead,
            None => ReadState::Unread,
        }
    }
}
