//! Trace/span context carriers

use std::collections::HashMap;

/// Well-known key for the trace identifier
pub const TRACE_ID_KEY: &str = "trace_id";
/// Well-known key for the span identifier
pub const SPAN_ID_KEY: &str = "span_id";

/// Opaque key-value carrier that trace identifiers are looked up in.
///
/// `None` means the key is absent; `Some("")` is a present, empty value.
pub trait ContextSource {
    fn value(&self, key: &str) -> Option<String>;
}

/// Simple map-backed context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    values: HashMap<String, String>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_span(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self::new()
            .with_value(TRACE_ID_KEY, trace_id)
            .with_value(SPAN_ID_KEY, span_id)
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ContextSource for TraceContext {
    fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl ContextSource for HashMap<String, String> {
    fn value(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<C: ContextSource + ?Sized> ContextSource for &C {
    fn value(&self, key: &str) -> Option<String> {
        (**self).value(key)
    }
}
