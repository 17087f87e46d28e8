//! Main logger implementation
//!
//! A [`Logger`] is a cheap handle onto a family of shared configuration
//! (sink, encoder, hooks, pool, metrics, policy) plus a few values it owns
//! outright (base fields, level, caller flag, redaction override). The
//! `with_*` derivations return new loggers in the same family.

use super::{
    caller::{CallerSource, LocationCaller},
    context::{ContextSource, SPAN_ID_KEY, TRACE_ID_KEY},
    encoder::{Encoder, JsonEncoder},
    entry::{Entry, EntryPool, DEFAULT_POOL_CAPACITY},
    error::{LoggerError, Result},
    field::{FieldValue, Fields},
    hook::Hook,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    redaction::{redact_secrets, RedactionPolicy},
    sink::{Sink, StdoutSink},
};
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Receives failures that happen inside `log()` (hook panics, encode and
/// write errors). Without one, failures go to stderr.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Configuration swapped at runtime and seen by every member of a family
struct SharedConfig {
    sink: Arc<dyn Sink>,
    encoder: Arc<dyn Encoder>,
    hooks: Arc<Vec<Arc<dyn Hook>>>,
}

/// State created once per root logger and shared by all derivations
struct Family {
    config: RwLock<SharedConfig>,
    pool: EntryPool,
    metrics: LoggerMetrics,
    policy: Arc<RedactionPolicy>,
    caller_source: Arc<dyn CallerSource>,
    on_error: Option<ErrorCallback>,
}

impl Family {
    fn report(&self, error: &LoggerError) {
        match self.on_error {
            Some(ref callback) => callback(error),
            None => eprintln!("{} {}", error.severity_tag(), error),
        }
    }
}

/// Values a logger owns and copies into its derivations
#[derive(Debug, Clone, Copy)]
struct LocalConfig {
    min_level: LogLevel,
    report_caller: bool,
}

/// Structured logger
///
/// # Example
///
/// ```
/// use logx::{fields, BufferSink, LogLevel, Logger};
///
/// let sink = BufferSink::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .output(sink.clone())
///     .build();
///
/// let request_logger = logger.with_fields(fields! { "request_id" => "r-1" });
/// request_logger.info("Request processed");
///
/// assert!(sink.contents_string().contains("\"request_id\":\"r-1\""));
/// ```
pub struct Logger {
    family: Arc<Family>,
    local: RwLock<LocalConfig>,
    fields: Arc<Fields>,
    redaction: Option<bool>,
}

struct Snapshot {
    sink: Arc<dyn Sink>,
    encoder: Arc<dyn Encoder>,
    hooks: Arc<Vec<Arc<dyn Hook>>>,
    report_caller: bool,
}

impl Logger {
    /// Logger with default configuration: Info level, stdout, JSON encoding,
    /// the global redaction policy.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Replace the sink for the whole family
    pub fn set_output<S: Sink + 'static>(&self, sink: S) {
        self.set_output_arc(Arc::new(sink));
    }

    pub fn set_output_arc(&self, sink: Arc<dyn Sink>) {
        self.family.config.write().sink = sink;
    }

    /// Replace the encoder for the whole family
    pub fn set_encoder<E: Encoder + 'static>(&self, encoder: E) {
        self.family.config.write().encoder = Arc::new(encoder);
    }

    /// Append a hook; every logger in the family fires it from now on
    pub fn add_hook<H: Hook + 'static>(&self, hook: H) {
        self.add_hook_arc(Arc::new(hook));
    }

    pub fn add_hook_arc(&self, hook: Arc<dyn Hook>) {
        let mut config = self.family.config.write();
        Arc::make_mut(&mut config.hooks).push(hook);
    }

    pub fn hook_count(&self) -> usize {
        self.family.config.read().hooks.len()
    }

    /// Set the minimum level of this logger only
    pub fn set_level(&self, level: LogLevel) {
        self.local.write().min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.local.read().min_level
    }

    pub fn set_report_caller(&self, enabled: bool) {
        self.local.write().report_caller = enabled;
    }

    pub fn report_caller(&self) -> bool {
        self.local.read().report_caller
    }

    /// Whether a call at `level` would produce output
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.local.read().min_level
    }

    /// Accumulated context fields of this logger
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// `None` when this logger follows the policy's field switch
    pub fn redaction_override(&self) -> Option<bool> {
        self.redaction
    }

    pub fn policy(&self) -> &Arc<RedactionPolicy> {
        &self.family.policy
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.family.metrics
    }

    pub fn pool(&self) -> &EntryPool {
        &self.family.pool
    }

    fn derive(&self, fields: Arc<Fields>, redaction: Option<bool>) -> Logger {
        Logger {
            family: Arc::clone(&self.family),
            local: RwLock::new(*self.local.read()),
            fields,
            redaction,
        }
    }

    /// New logger whose base fields are ours overlaid with `extra`
    #[must_use]
    pub fn with_fields(&self, extra: Fields) -> Logger {
        if extra.is_empty() {
            return self.derive(Arc::clone(&self.fields), self.redaction);
        }

        let mut merged = Fields::with_capacity(self.fields.len() + extra.len());
        merged.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(extra);
        self.derive(Arc::new(merged), self.redaction)
    }

    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Logger {
        let mut extra = Fields::with_capacity(1);
        extra.insert(key.into(), value.into());
        self.with_fields(extra)
    }

    /// New logger carrying the trace and span identifiers found in `ctx`.
    /// Absent identifiers are left out; empty ones are kept.
    #[must_use]
    pub fn with_context<C: ContextSource + ?Sized>(&self, ctx: &C) -> Logger {
        let mut extra = Fields::new();
        if let Some(trace_id) = ctx.value(TRACE_ID_KEY) {
            extra.insert(TRACE_ID_KEY.to_string(), FieldValue::String(trace_id));
        }
        if let Some(span_id) = ctx.value(SPAN_ID_KEY) {
            extra.insert(SPAN_ID_KEY.to_string(), FieldValue::String(span_id));
        }
        self.with_fields(extra)
    }

    /// New logger with an explicit redaction switch that wins over the policy
    #[must_use]
    pub fn with_redaction(&self, enabled: bool) -> Logger {
        self.derive(Arc::clone(&self.fields), Some(enabled))
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_at(level, message.into(), None, Location::caller());
    }

    /// Log with call-site fields; they win over the logger's base fields
    #[track_caller]
    pub fn log_with_fields(&self, level: LogLevel, message: impl Into<String>, fields: Fields) {
        self.log_at(level, message.into(), Some(fields), Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Trace, message.into(), None, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Debug, message.into(), None, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Info, message.into(), None, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Warn, message.into(), None, Location::caller());
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log_at(LogLevel::Error, message.into(), None, Location::caller());
    }

    /// Log at Panic level, then panic with the message
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.log_at(LogLevel::Panic, message.clone(), None, Location::caller());
        self.flush_quietly();
        panic!("{}", message);
    }

    /// Log at Fatal level, flush the sink, then exit the process with status 1
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        self.log_at(LogLevel::Fatal, message.into(), None, Location::caller());
        self.flush_quietly();
        std::process::exit(1);
    }

    /// Flush the family's sink
    pub fn flush(&self) -> Result<()> {
        let sink = Arc::clone(&self.family.config.read().sink);
        sink.flush()
    }

    fn flush_quietly(&self) {
        if let Err(e) = self.flush() {
            self.family.report(&e);
        }
    }

    /// Take everything the slow path needs, releasing each lock before the
    /// next one is taken. Returns `None` when `level` is gated out.
    fn snapshot(&self, level: LogLevel) -> Option<Snapshot> {
        let local = *self.local.read();
        if level < local.min_level {
            return None;
        }

        let config = self.family.config.read();
        Some(Snapshot {
            sink: Arc::clone(&config.sink),
            encoder: Arc::clone(&config.encoder),
            hooks: Arc::clone(&config.hooks),
            report_caller: local.report_caller,
        })
    }

    fn log_at(
        &self,
        level: LogLevel,
        message: String,
        extra: Option<Fields>,
        location: &'static Location<'static>,
    ) {
        let Some(snapshot) = self.snapshot(level) else {
            self.family.metrics.record_filtered();
            return;
        };
        let policy = self.family.policy.snapshot();

        let mut entry = self.family.pool.acquire();
        entry.time = Utc::now();
        entry.level = level;

        let redact = self.redaction.unwrap_or_else(|| policy.field_redaction());

        entry.message = if redact && policy.message_redaction() {
            policy.redact_message(&message)
        } else {
            message
        };

        let mut merged = std::mem::take(&mut entry.fields);
        merged.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(extra) = extra {
            merged.extend(extra);
        }

        entry.fields = if redact {
            policy.redact_fields(merged)
        } else {
            redact_secrets(merged)
        };
        entry.trace_id = take_string_field(&mut entry.fields, TRACE_ID_KEY);
        entry.span_id = take_string_field(&mut entry.fields, SPAN_ID_KEY);

        if snapshot.report_caller {
            entry.caller = self.family.caller_source.caller(location);
        }

        self.fire_hooks(&snapshot.hooks, &entry);
        self.write_entry(&snapshot, &entry);

        self.family.pool.release(entry);
    }

    /// Fire every hook in registration order, each isolated from the others
    fn fire_hooks(&self, hooks: &[Arc<dyn Hook>], entry: &Entry) {
        for (idx, hook) in hooks.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                hook.fire(entry)
            }));

            if let Err(panic_info) = result {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                self.family.metrics.record_hook_panic();
                self.family
                    .report(&LoggerError::hook_panic(idx, hook.name(), panic_msg));
            }
        }
    }

    fn write_entry(&self, snapshot: &Snapshot, entry: &Entry) {
        let mut bytes = match snapshot.encoder.encode(entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.family.metrics.record_encode_failure();
                self.family.report(&e);
                return;
            }
        };

        while matches!(bytes.last(), Some(b'\n') | Some(b'\r')) {
            bytes.pop();
        }
        bytes.push(b'\n');

        match snapshot.sink.write(&bytes) {
            Ok(()) => {
                self.family.metrics.record_written();
            }
            Err(e) => {
                self.family.metrics.record_write_failure();
                self.family.report(&LoggerError::write(format!(
                    "{} sink: {}",
                    snapshot.sink.name(),
                    e
                )));
            }
        }
    }
}

/// Move a string-valued field out of the map
fn take_string_field(fields: &mut Fields, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(FieldValue::String(_)) => match fields.remove(key) {
            Some(FieldValue::String(value)) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        self.derive(Arc::clone(&self.fields), self.redaction)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = *self.local.read();
        f.debug_struct("Logger")
            .field("min_level", &local.min_level)
            .field("report_caller", &local.report_caller)
            .field("fields", &self.fields.len())
            .field("redaction", &self.redaction)
            .field("hooks", &self.hook_count())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use logx::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .output(StderrSink)
///     .encoder(ConsoleEncoder::new().with_colors(true))
///     .report_caller(true)
///     .on_error(Arc::new(|err| {
///         eprintln!("ALERT: {}", err);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    sink: Option<Arc<dyn Sink>>,
    encoder: Option<Arc<dyn Encoder>>,
    hooks: Vec<Arc<dyn Hook>>,
    report_caller: bool,
    policy: Option<Arc<RedactionPolicy>>,
    caller_source: Option<Arc<dyn CallerSource>>,
    on_error: Option<ErrorCallback>,
    pool_capacity: usize,
    fields: Fields,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            sink: None,
            encoder: None,
            hooks: Vec::new(),
            report_caller: false,
            policy: None,
            caller_source: None,
            on_error: None,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            fields: Fields::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn output<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder<E: Encoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Add a hook; hooks fire in the order they were added
    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_caller(mut self, enabled: bool) -> Self {
        self.report_caller = enabled;
        self
    }

    /// Use an explicit policy instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn policy(mut self, policy: Arc<RedactionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_source<C: CallerSource + 'static>(mut self, source: C) -> Self {
        self.caller_source = Some(Arc::new(source));
        self
    }

    /// Route pipeline failures to a callback instead of stderr
    ///
    /// # Example
    ///
    /// ```
    /// use logx::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let logger = Logger::builder()
    ///     .on_error(Arc::new(|err| {
    ///         eprintln!("Warning: {}", err);
    ///     }))
    ///     .build();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Base fields of the root logger
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let config = SharedConfig {
            sink: self.sink.unwrap_or_else(|| Arc::new(StdoutSink)),
            encoder: self
                .encoder
                .unwrap_or_else(|| Arc::new(JsonEncoder::new())),
            hooks: Arc::new(self.hooks),
        };

        let family = Family {
            config: RwLock::new(config),
            pool: EntryPool::new(self.pool_capacity),
            metrics: LoggerMetrics::new(),
            policy: self.policy.unwrap_or_else(RedactionPolicy::global),
            caller_source: self
                .caller_source
                .unwrap_or_else(|| Arc::new(LocationCaller)),
            on_error: self.on_error,
        };

        Logger {
            family: Arc::new(family),
            local: RwLock::new(LocalConfig {
                min_level: self.min_level,
                report_caller: self.report_caller,
            }),
            fields: Arc::new(self.fields),
            redaction: None,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        caller::FixedCaller, context::TraceContext, hook::HookFn, secret::SecretValue,
        sink::BufferSink, REDACTED,
    };
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn isolated() -> (Logger, BufferSink, Arc<RedactionPolicy>) {
        let sink = BufferSink::new();
        let policy = Arc::new(RedactionPolicy::new());
        let logger = Logger::builder()
            .min_level(LogLevel::Trace)
            .output(sink.clone())
            .policy(Arc::clone(&policy))
            .on_error(Arc::new(|_| {}))
            .build();
        (logger, sink, policy)
    }

    fn decode_lines(sink: &BufferSink) -> Vec<Entry> {
        let encoder = JsonEncoder::new();
        sink.lines()
            .iter()
            .map(|line| encoder.decode(line.as_bytes()).unwrap())
            .collect()
    }

    struct FailingEncoder;

    impl Encoder for FailingEncoder {
        fn encode(&self, _entry: &Entry) -> Result<Vec<u8>> {
            Err(LoggerError::encode("failing", "always fails"))
        }
    }

    struct NewlineEncoder;

    impl Encoder for NewlineEncoder {
        fn encode(&self, entry: &Entry) -> Result<Vec<u8>> {
            Ok(format!("{}\n\n", entry.message).into_bytes())
        }
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(!logger.report_caller());
        assert_eq!(logger.redaction_override(), None);
        assert_eq!(logger.hook_count(), 0);
        assert_eq!(logger.pool().capacity(), DEFAULT_POOL_CAPACITY);
        assert!(Arc::ptr_eq(logger.policy(), &RedactionPolicy::global()));
    }

    #[test]
    fn test_level_gate_produces_nothing() {
        let (logger, sink, _) = isolated();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        logger.add_hook(HookFn::new(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        logger.set_level(LogLevel::Warn);
        logger.info("below threshold");
        logger.debug("below threshold");

        assert!(sink.is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(logger.metrics().filtered(), 2);
        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Error));
    }

    #[test]
    fn test_hooks_fire_in_order_before_write() {
        let (logger, sink, _) = isolated();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = Arc::clone(&order);
            let sink = sink.clone();
            logger.add_hook(HookFn::new(move |_| {
                assert!(sink.is_empty());
                order.lock().push(id);
            }));
        }

        logger.info("hello");
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_hook_panic_is_isolated() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);
        let sink = BufferSink::new();
        let reached = Arc::new(AtomicUsize::new(0));
        let reached_clone = Arc::clone(&reached);

        let logger = Logger::builder()
            .output(sink.clone())
            .policy(Arc::new(RedactionPolicy::new()))
            .hook(HookFn::new(|_| panic!("hook exploded")).named("bad"))
            .hook(HookFn::new(move |_| {
                reached_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .on_error(Arc::new(move |err| errors_clone.lock().push(err.to_string())))
            .build();

        logger.info("survives");

        assert_eq!(reached.load(Ordering::SeqCst), 1);
        assert_eq!(sink.lines().len(), 1);
        assert_eq!(logger.metrics().hook_panics(), 1);
        assert_eq!(*errors.lock(), vec!["Hook #0 (bad) panicked: hook exploded"]);
    }

    #[test]
    fn test_encode_failure_goes_to_diagnostics() {
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let sink = BufferSink::new();
        let logger = Logger::builder()
            .output(sink.clone())
            .encoder(FailingEncoder)
            .on_error(Arc::new(move |err| {
                assert!(matches!(err, LoggerError::EncodeError { .. }));
                errors_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .build();

        logger.info("never written");

        assert!(sink.is_empty());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(logger.metrics().encode_failures(), 1);
    }

    #[test]
    fn test_exactly_one_trailing_newline() {
        let (logger, sink, _) = isolated();
        logger.set_encoder(NewlineEncoder);
        logger.info("a");
        logger.info("b");
        assert_eq!(sink.contents_string(), "a\nb\n");
    }

    #[test]
    fn test_call_fields_override_base_fields() {
        let (logger, sink, _) = isolated();
        let child = logger.with_fields(crate::fields! { "k" => "base", "only_base" => 1 });

        child.log_with_fields(LogLevel::Info, "msg", crate::fields! { "k" => "call" });

        let entries = decode_lines(&sink);
        assert_eq!(entries[0].fields["k"], FieldValue::from("call"));
        assert_eq!(entries[0].fields["only_base"], FieldValue::Int(1));
    }

    #[test]
    fn test_derivation_does_not_touch_parent() {
        let (logger, _, _) = isolated();
        let child = logger.with_field("a", 1);
        let grandchild = child.with_field("a", 2).with_field("b", 3);

        assert!(logger.fields().is_empty());
        assert_eq!(child.fields()["a"], FieldValue::Int(1));
        assert_eq!(grandchild.fields()["a"], FieldValue::Int(2));
        assert_eq!(grandchild.fields().len(), 2);
    }

    #[test]
    fn test_level_copied_by_value_hooks_shared_by_reference() {
        let (logger, sink, _) = isolated();
        let child = logger.with_field("c", true);

        logger.set_level(LogLevel::Error);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        logger.add_hook(HookFn::new(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        child.info("child keeps its level and sees the new hook");

        assert_eq!(child.level(), LogLevel::Trace);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_output_shared_by_reference() {
        let (logger, old_sink, _) = isolated();
        let child = logger.with_field("c", 1);

        let new_sink = BufferSink::new();
        logger.set_output(new_sink.clone());
        child.info("to new sink");

        assert!(old_sink.is_empty());
        assert_eq!(new_sink.lines().len(), 1);
    }

    #[test]
    fn test_with_redaction_override() {
        let (logger, sink, _) = isolated();
        let raw = logger.with_redaction(false);

        logger.log_with_fields(LogLevel::Info, "x", crate::fields! { "password" => "p" });
        raw.log_with_fields(
            LogLevel::Info,
            "x",
            crate::fields! { "password" => "p", "secret_value" => SecretValue::text("s") },
        );

        let entries = decode_lines(&sink);
        assert_eq!(entries[0].fields["password"], FieldValue::from(REDACTED));
        assert_eq!(entries[1].fields["password"], FieldValue::from("p"));
        assert_eq!(entries[1].fields["secret_value"], FieldValue::from(REDACTED));
        assert_eq!(raw.with_field("x", 1).redaction_override(), Some(false));
    }

    #[test]
    fn test_override_true_wins_over_disabled_policy() {
        let (logger, sink, policy) = isolated();
        policy.enable_redaction(false);

        logger.log_with_fields(LogLevel::Info, "x", crate::fields! { "token" => "t" });
        logger
            .with_redaction(true)
            .log_with_fields(LogLevel::Info, "x", crate::fields! { "token" => "t" });

        let entries = decode_lines(&sink);
        assert_eq!(entries[0].fields["token"], FieldValue::from("t"));
        assert_eq!(entries[1].fields["token"], FieldValue::from(REDACTED));
    }

    #[test]
    fn test_message_redaction_needs_both_switches() {
        let (logger, sink, policy) = isolated();
        logger.info("contact alice@example.com");
        policy.enable_message_redaction(false);
        logger.info("contact alice@example.com");

        let entries = decode_lines(&sink);
        assert_eq!(entries[0].message, "contact [REDACTED]");
        assert_eq!(entries[1].message, "contact alice@example.com");
    }

    #[test]
    fn test_with_context_promotes_trace_ids() {
        let (logger, sink, _) = isolated();
        let ctx = TraceContext::with_trace_span("trace-1", "span-1");
        logger.with_context(&ctx).info("traced");
        logger.with_context(&TraceContext::new()).info("untraced");

        let entries = decode_lines(&sink);
        assert_eq!(entries[0].trace_id.as_deref(), Some("trace-1"));
        assert_eq!(entries[0].span_id.as_deref(), Some("span-1"));
        assert!(!entries[0].fields.contains_key(TRACE_ID_KEY));
        assert_eq!(entries[1].trace_id, None);
        assert!(entries[1].fields.is_empty());
    }

    #[test]
    fn test_report_caller() {
        let sink = BufferSink::new();
        let logger = Logger::builder()
            .output(sink.clone())
            .report_caller(true)
            .build();

        let expected_line = line!() + 1;
        logger.info("where am I");

        let fixed = logger.clone();
        fixed.set_report_caller(false);
        fixed.info("no caller");

        let entries = decode_lines(&sink);
        assert_eq!(
            entries[0].caller,
            Some(format!("{}:{}", file!(), expected_line))
        );
        assert_eq!(entries[1].caller, None);
    }

    #[test]
    fn test_fixed_caller_source() {
        let sink = BufferSink::new();
        let logger = Logger::builder()
            .output(sink.clone())
            .report_caller(true)
            .caller_source(FixedCaller::new("app.rs:7"))
            .build();
        logger.warn("fixed");

        assert_eq!(decode_lines(&sink)[0].caller.as_deref(), Some("app.rs:7"));
    }

    #[test]
    fn test_entries_return_to_pool_without_leaking() {
        let (logger, sink, _) = isolated();
        logger.log_with_fields(LogLevel::Info, "first", crate::fields! { "leak" => 1 });
        assert_eq!(logger.pool().idle(), 1);

        logger.info("second");
        let entries = decode_lines(&sink);
        assert!(entries[1].fields.is_empty());
        assert_eq!(logger.metrics().written(), 2);
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_panic_level_logs_then_panics() {
        let (logger, _, _) = isolated();
        logger.panic("boom");
    }

    #[test]
    fn test_invalid_timestamp_format_is_reported_not_raised() {
        let sink = BufferSink::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);
        let logger = Logger::builder()
            .output(sink.clone())
            .encoder(
                JsonEncoder::new()
                    .with_timestamp_format(crate::core::TimestampFormat::Custom("%Q".into())),
            )
            .policy(Arc::new(RedactionPolicy::new()))
            .on_error(Arc::new(move |err| errors_clone.lock().push(err.to_string())))
            .build();

        logger.info("hello");

        assert!(sink.is_empty());
        assert_eq!(errors.lock().len(), 1);
        assert!(errors.lock()[0].contains("%Q"));
        assert_eq!(logger.metrics().encode_failures(), 1);
        assert_eq!(logger.pool().idle(), 1);
    }

    #[test]
    fn test_pooled_field_map_keeps_allocation() {
        let (logger, _, _) = isolated();
        let mut fields = Fields::new();
        for i in 0..32 {
            fields.insert(format!("k{}", i), FieldValue::Int(i));
        }

        logger.log_with_fields(LogLevel::Info, "wide", fields);
        let mut narrow = Fields::new();
        narrow.insert("only".into(), FieldValue::Int(1));
        logger.log_with_fields(LogLevel::Info, "narrow", narrow.clone());
        logger.with_redaction(false).log_with_fields(LogLevel::Info, "narrow", narrow);

        assert_eq!(logger.pool().idle(), 1);
        let entry = logger.pool().acquire();
        assert!(entry.fields.is_empty());
        assert!(entry.fields.capacity() >= 32);
    }
}
