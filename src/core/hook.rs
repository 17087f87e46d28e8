//! Hook capability: side-effecting observers fired once per emitted entry

use super::entry::Entry;
use std::fmt;

/// Observer invoked synchronously for every entry that passes the level gate.
///
/// Hooks see the entry after redaction and before encoding. They must not
/// keep a reference past `fire` returning; clone what needs to outlive the
/// call. Panics are caught by the logger and reported on the diagnostic
/// channel, so a failing hook never blocks the next hook or the sink write.
pub trait Hook: Send + Sync {
    fn fire(&self, entry: &Entry);

    fn name(&self) -> &str {
        "hook"
    }
}

/// Closure adapter implementing [`Hook`]
pub struct HookFn<F>
where
    F: Fn(&Entry) + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> HookFn<F>
where
    F: Fn(&Entry) + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            name: "fn".to_string(),
            func,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> Hook for HookFn<F>
where
    F: Fn(&Entry) + Send + Sync,
{
    fn fire(&self, entry: &Entry) {
        (self.func)(entry)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for HookFn<F>
where
    F: Fn(&Entry) + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookFn").field("name", &self.name).finish()
    }
}
