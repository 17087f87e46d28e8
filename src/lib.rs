//! # logx
//!
//! Structured logging with layered redaction.
//!
//! ## Features
//!
//! - **Structured fields**: typed `FieldValue`s merged from logger context and call site
//! - **Derived loggers**: `with_fields`, `with_context` and `with_redaction` return new
//!   loggers sharing the parent's sink, encoder and hooks
//! - **Redaction**: sensitive keys, regex patterns and custom redactors applied to fields
//!   and messages, plus `SecretValue` that never prints its contents
//! - **Hooks**: file, rotating file, HTTP and vendor (DataDog, Loggly, New Relic, Atatus)
//!
//! ## Example
//!
//! ```
//! use logx::prelude::*;
//! use logx::fields;
//!
//! let sink = BufferSink::new();
//! let logger = Logger::builder().output(sink.clone()).build();
//!
//! logger
//!     .with_fields(fields! { "user" => "alice", "password" => "hunter2" })
//!     .info("User logged in");
//!
//! let line = sink.contents_string();
//! assert!(line.contains("\"user\":\"alice\""));
//! assert!(!line.contains("hunter2"));
//! ```

pub mod core;
pub mod hooks;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        BufferSink, ConsoleEncoder, ContextSource, Encoder, Entry, FieldValue, Fields, FileSink,
        Hook, HookFn, JsonEncoder, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        RedactionPolicy, Result, SecretValue, Sink, StderrSink, StdoutSink, TimestampFormat,
        TraceContext, WriterSink,
    };
}

pub use core::global::{
    add_hook, debug, default_logger, error, flush, info, init, log, log_with_fields, set_encoder,
    set_level, set_output, set_report_caller, trace, warn, with_context, with_fields,
    with_redaction,
};
pub use core::redaction::{
    add_custom_redactor, add_key_redactor, add_message_redactor, add_regex_redactor,
    enable_message_redaction, enable_redaction,
};
pub use core::{
    mask, BufferSink, CallerSource, ConsoleEncoder, ContextSource, Encoder, Entry, EntryPool,
    ErrorCallback, FieldValue, Fields, FileSink, FixedCaller, Hook, HookFn, JsonEncoder,
    LocationCaller, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, PolicySnapshot,
    RedactionPolicy, Result, SecretValue, Sink, StderrSink, StdoutSink, TimestampFormat,
    TraceContext, WriterSink, REDACTED, SPAN_ID_KEY, TRACE_ID_KEY,
};
