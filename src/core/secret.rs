//! Opaque holder for values that must never reach a log line.

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder emitted in place of any redacted value.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Clone, PartialEq, Eq)]
enum SecretInner {
    Text(String),
    Bytes(Vec<u8>),
}

/// A string or byte sequence whose every serialization is `[REDACTED]`.
///
/// `Display`, `Debug` and `Serialize` all produce the placeholder. The wrapped
/// value is only reachable through [`SecretValue::expose_str`] and
/// [`SecretValue::expose_bytes`], which the logging pipeline never calls.
///
/// # Example
///
/// ```
/// use logx::SecretValue;
///
/// let password = SecretValue::text("hunter2");
/// assert_eq!(password.to_string(), "[REDACTED]");
/// assert_eq!(serde_json::to_string(&password).unwrap(), "\"[REDACTED]\"");
/// assert_eq!(password.expose_str(), Some("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    inner: SecretInner,
}

impl SecretValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            inner: SecretInner::Text(value.into()),
        }
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: SecretInner::Bytes(value.into()),
        }
    }

    /// Returns the wrapped string, or `None` for byte secrets.
    #[must_use]
    pub fn expose_str(&self) -> Option<&str> {
        match &self.inner {
            SecretInner::Text(s) => Some(s),
            SecretInner::Bytes(_) => None,
        }
    }

    /// Returns the raw wrapped bytes (UTF-8 bytes for text secrets).
    #[must_use]
    pub fn expose_bytes(&self) -> &[u8] {
        match &self.inner {
            SecretInner::Text(s) => s.as_bytes(),
            SecretInner::Bytes(b) => b,
        }
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretValue").field(&REDACTED).finish()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}
