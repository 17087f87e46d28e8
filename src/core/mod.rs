//! Core logger types and traits

pub mod caller;
pub mod context;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod field;
pub mod global;
pub mod hook;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod patterns;
pub mod redaction;
pub mod secret;
pub mod sink;
pub mod timestamp;

pub use caller::{CallerSource, FixedCaller, LocationCaller};
pub use context::{ContextSource, TraceContext, SPAN_ID_KEY, TRACE_ID_KEY};
pub use encoder::{ConsoleEncoder, Encoder, JsonEncoder};
pub use entry::{Entry, EntryPool, DEFAULT_POOL_CAPACITY};
pub use error::{LoggerError, Result};
pub use field::{format_fields, FieldValue, Fields};
pub use hook::{Hook, HookFn};
pub use log_level::LogLevel;
pub use logger::{ErrorCallback, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use redaction::{
    mask, redact_secrets, FieldRedactor, MessageRedactor, PolicySnapshot, RedactionPolicy,
};
pub use secret::{SecretValue, REDACTED};
pub use sink::{BufferSink, FileSink, Sink, StderrSink, StdoutSink, WriterSink};
pub use timestamp::TimestampFormat;
