//! Log entry structure and the per-family entry pool

use super::field::Fields;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One log record, fully assembled and redacted, prior to encoding.
///
/// Entries handed to hooks are borrowed from the logger's pool; a hook must
/// clone anything it wants to keep past `fire`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub time: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

impl Entry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Clear every field so the entry can be reused. The field map keeps its
    /// allocation.
    pub fn reset(&mut self) {
        self.time = DateTime::<Utc>::default();
        self.level = LogLevel::default();
        self.message.clear();
        self.fields.clear();
        self.caller = None;
        self.trace_id = None;
        self.span_id = None;
    }
}

/// Default number of idle entries a pool keeps around
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Free list of entries shared by every logger derived from a common root.
///
/// Entries are reset both when they are returned and when they are handed
/// out, so nothing from a previous call can leak into the next one.
#[derive(Debug)]
pub struct EntryPool {
    free: Mutex<Vec<Entry>>,
    capacity: usize,
}

impl EntryPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take an entry out of the pool, allocating when the free list is empty
    pub fn acquire(&self) -> Entry {
        let mut entry = self.free.lock().pop().unwrap_or_default();
        entry.reset();
        entry
    }

    /// Return an entry; dropped instead when the pool is already full
    pub fn release(&self, mut entry: Entry) {
        entry.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(entry);
        }
    }

    /// Number of idle entries currently held
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EntryPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}
