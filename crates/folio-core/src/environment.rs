//! Environment predicates consulted while loading and navigating
//!
//! Content may be conditional on flags of the host environment (inclusion) and
//! on progress markers the reader has unlocked (locking).

use ahash::AHashSet;

use crate::ContentId;

/// Host environment queried by inclusion and lock predicates
pub trait Environment: Send + Sync {
    /// Whether a named environment flag is set
    fn is_flag_enabled(&self, flag: &str) -> bool;

    /// Whether the reader has unlocked the given progress marker
    fn is_unlocked(&self, advancement: &ContentId) -> bool;
}

/// Evaluate a flag expression: empty is always true, `!flag` negates
pub fn flag_matches(environment: &dyn Environment, expression: &str) -> bool {
    let expression = expression.trim();
    if expression.is_empty() {
        return true;
    }
    match expression.strip_prefix('!') {
        Some(flag) => !environment.is_flag_enabled(flag.trim()),
        None => environment.is_flag_enabled(expression),
    }
}

/// Environment backed by fixed sets, for tools and tests
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    flags: AHashSet<String>,
    unlocked: AHashSet<ContentId>,
    unlock_all: bool,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn with_unlocked(mut self, advancement: ContentId) -> Self {
        self.unlocked.insert(advancement);
        self
    }

    /// Treat every progress marker as unlocked
    pub fn unlocking_everything(mut self) -> Self {
        self.unlock_all = true;
        self
    }

    pub fn set_flag(&mut self, flag: impl Into<String>, enabled: bool) {
        let flag = flag.into();
        if enabled {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    pub fn unlock(&mut self, advancement: ContentId) {
        self.unlocked.insert(advancement);
    }
}

impl Environment for StaticEnvironment {
    fn is_flag_enabled(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn is_unlocked(&self, advancement: &ContentId) -> bool {
        self.unlock_all || self.unlocked.contains(advancement)
    }
}
