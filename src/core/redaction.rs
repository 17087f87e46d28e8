//! Redaction policy and engine
//!
//! This module provides:
//! - `RedactionPolicy`: the live, mutable rule set behind a reader/writer lock
//! - `PolicySnapshot`: an immutable view of the rules, taken once per log call
//! - `mask`: a standalone deep-masking helper independent of any policy
//!
//! A process-wide policy is reachable through [`RedactionPolicy::global`] and
//! the free functions at the bottom of this module. Loggers hold an explicit
//! `Arc<RedactionPolicy>`, so tests can build isolated policies.

use super::field::{FieldValue, Fields};
use super::patterns::{BUILT_IN_PATTERNS, DEFAULT_SENSITIVE_KEYS};
use parking_lot::RwLock;
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

pub use super::secret::REDACTED;

/// Custom field redactor: receives the key and the current value, returns the
/// value to keep.
pub type FieldRedactor = Arc<dyn Fn(&str, FieldValue) -> FieldValue + Send + Sync>;

/// Custom message redactor: receives the whole message so far.
pub type MessageRedactor = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Immutable view of a [`RedactionPolicy`]
#[derive(Clone)]
pub struct PolicySnapshot {
    field_redaction: bool,
    message_redaction: bool,
    sensitive_keys: HashSet<String>,
    patterns: Vec<Regex>,
    field_redactors: Vec<FieldRedactor>,
    message_redactors: Vec<MessageRedactor>,
}

impl PolicySnapshot {
    fn with_defaults() -> Self {
        let patterns = BUILT_IN_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self {
            field_redaction: true,
            message_redaction: true,
            sensitive_keys: DEFAULT_SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect(),
            patterns,
            field_redactors: Vec::new(),
            message_redactors: Vec::new(),
        }
    }

    pub fn field_redaction(&self) -> bool {
        self.field_redaction
    }

    pub fn message_redaction(&self) -> bool {
        self.message_redaction
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        self.sensitive_keys.contains(&key.to_lowercase())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Apply key, custom and pattern rules to every field.
    ///
    /// Values are rewritten in place, so the map keeps its allocation.
    pub fn redact_fields(&self, mut fields: Fields) -> Fields {
        for (key, value) in fields.iter_mut() {
            let current = std::mem::replace(value, FieldValue::Null);
            *value = self.redact_field(key, current);
        }
        fields
    }

    fn redact_field(&self, key: &str, value: FieldValue) -> FieldValue {
        if value.is_secret() || self.is_sensitive_key(key) {
            return FieldValue::redacted();
        }

        let value = self
            .field_redactors
            .iter()
            .fold(value, |current, redactor| redactor(key, current));

        if let FieldValue::String(s) = &value {
            if self.patterns.iter().any(|p| p.is_match(s)) {
                return FieldValue::redacted();
            }
        }

        value
    }

    /// Replace every pattern match inside `message`, then run the custom
    /// message redactors over the result.
    pub fn redact_message(&self, message: &str) -> String {
        let mut result = message.to_string();
        for pattern in &self.patterns {
            let replaced = match pattern.replace_all(&result, NoExpand(REDACTED)) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(replaced) => replaced,
            };
            result = replaced;
        }

        self.message_redactors
            .iter()
            .fold(result, |current, redactor| redactor(current))
    }
}

/// Process-wide or isolated set of redaction rules
///
/// Reads clone an `Arc` under a momentary read lock; mutations copy the
/// snapshot under the write lock, so in-flight log calls keep the view they
/// started with.
///
/// # Example
///
/// ```
/// use logx::core::RedactionPolicy;
///
/// let policy = RedactionPolicy::new();
/// policy.add_key_redactor(["Session_ID"]);
/// policy.add_regex_redactor([r"(?i)token=[A-Za-z0-9]+", "(unclosed"]);
///
/// let snapshot = policy.snapshot();
/// assert!(snapshot.is_sensitive_key("session_id"));
/// assert_eq!(snapshot.redact_message("token=abc"), "[REDACTED]");
/// ```
pub struct RedactionPolicy {
    state: RwLock<Arc<PolicySnapshot>>,
}

impl RedactionPolicy {
    /// Policy with built-in patterns, default sensitive keys and both
    /// switches on.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(PolicySnapshot::with_defaults())),
        }
    }

    /// The process-wide policy used by loggers that are not given their own
    pub fn global() -> Arc<RedactionPolicy> {
        static GLOBAL: OnceLock<Arc<RedactionPolicy>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RedactionPolicy::new())))
    }

    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&*self.state.read())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().field_redaction
    }

    pub fn is_message_redaction_enabled(&self) -> bool {
        self.state.read().message_redaction
    }

    fn update(&self, mutate: impl FnOnce(&mut PolicySnapshot)) {
        let mut state = self.state.write();
        mutate(Arc::make_mut(&mut *state));
    }

    pub fn enable_redaction(&self, enabled: bool) {
        self.update(|s| s.field_redaction = enabled);
    }

    pub fn enable_message_redaction(&self, enabled: bool) {
        self.update(|s| s.message_redaction = enabled);
    }

    /// Lowercase and add keys to the sensitive set; adding twice is a no-op
    pub fn add_key_redactor<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_lowercase()).collect();
        self.update(|s| s.sensitive_keys.extend(keys));
    }

    /// Compile and append patterns. Patterns that fail to compile are skipped
    /// and the rest are still added.
    pub fn add_regex_redactor<I, S>(&self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled: Vec<Regex> = patterns
            .into_iter()
            .filter_map(|p| Regex::new(p.as_ref()).ok())
            .collect();
        if compiled.is_empty() {
            return;
        }
        self.update(|s| s.patterns.extend(compiled));
    }

    pub fn add_custom_redactor<F>(&self, redactor: F)
    where
        F: Fn(&str, FieldValue) -> FieldValue + Send + Sync + 'static,
    {
        let redactor: FieldRedactor = Arc::new(redactor);
        self.update(|s| s.field_redactors.push(redactor));
    }

    pub fn add_message_redactor<F>(&self, redactor: F)
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        let redactor: MessageRedactor = Arc::new(redactor);
        self.update(|s| s.message_redactors.push(redactor));
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedactionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RedactionPolicy")
            .field("field_redaction", &state.field_redaction)
            .field("message_redaction", &state.message_redaction)
            .field("sensitive_keys", &state.sensitive_keys.len())
            .field("patterns", &state.patterns.len())
            .field("field_redactors", &state.field_redactors.len())
            .field("message_redactors", &state.message_redactors.len())
            .finish()
    }
}

/// Replace top-level secret values with the placeholder, leaving every other
/// field untouched. Used when redaction is switched off.
pub fn redact_secrets(mut fields: Fields) -> Fields {
    for value in fields.values_mut() {
        if value.is_secret() {
            *value = FieldValue::redacted();
        }
    }
    fields
}

/// Deep-mask `data`: every value whose key (case-insensitive) is listed in
/// `sensitive_keys` becomes `[REDACTED]`, nested maps and lists are walked.
///
/// # Example
///
/// ```
/// use logx::{fields, mask, FieldValue};
///
/// let data = fields! {
///     "password" => "x",
///     "nested" => fields! { "email" => "y" },
/// };
/// let masked = mask(&data, ["password", "email"]);
/// assert_eq!(masked["password"], FieldValue::from("[REDACTED]"));
/// assert_eq!(masked["nested"], FieldValue::Map(fields! { "email" => "[REDACTED]" }));
/// ```
pub fn mask<I, S>(data: &Fields, sensitive_keys: I) -> Fields
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keys: HashSet<String> = sensitive_keys
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .collect();
    mask_map(data, &keys)
}

fn mask_map(data: &Fields, keys: &HashSet<String>) -> Fields {
    data.iter()
        .map(|(key, value)| {
            let masked = if keys.contains(&key.to_lowercase()) {
                FieldValue::redacted()
            } else {
                mask_value(value, keys)
            };
            (key.clone(), masked)
        })
        .collect()
}

fn mask_value(value: &FieldValue, keys: &HashSet<String>) -> FieldValue {
    match value {
        FieldValue::Map(map) => FieldValue::Map(mask_map(map, keys)),
        FieldValue::List(items) => {
            FieldValue::List(items.iter().map(|v| mask_value(v, keys)).collect())
        }
        other => other.clone(),
    }
}

pub fn enable_redaction(enabled: bool) {
    RedactionPolicy::global().enable_redaction(enabled);
}

pub fn enable_message_redaction(enabled: bool) {
    RedactionPolicy::global().enable_message_redaction(enabled);
}

pub fn add_key_redactor<I, S>(keys: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RedactionPolicy::global().add_key_redactor(keys);
}

pub fn add_regex_redactor<I, S>(patterns: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RedactionPolicy::global().add_regex_redactor(patterns);
}

pub fn add_custom_redactor<F>(redactor: F)
where
    F: Fn(&str, FieldValue) -> FieldValue + Send + Sync + 'static,
{
    RedactionPolicy::global().add_custom_redactor(redactor);
}

pub fn add_message_redactor<F>(redactor: F)
where
    F: Fn(String) -> String + Send + Sync + 'static,
{
    RedactionPolicy::global().add_message_redactor(redactor);
}
