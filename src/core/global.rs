//! Process default logger and free-function wrappers around it
//!
//! The default logger is built lazily on first use with the builder
//! defaults (Info, stdout, JSON, global redaction policy).

use super::{
    context::ContextSource, encoder::Encoder, field::Fields, hook::Hook, log_level::LogLevel,
    logger::Logger, sink::Sink,
};
use std::sync::OnceLock;

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

/// The process default logger
pub fn default_logger() -> &'static Logger {
    DEFAULT_LOGGER.get_or_init(Logger::new)
}

/// Install `logger` as the process default.
///
/// Only succeeds before the default logger was first used; otherwise the
/// logger is handed back.
pub fn init(logger: Logger) -> std::result::Result<(), Logger> {
    DEFAULT_LOGGER.set(logger)
}

pub fn set_level(level: LogLevel) {
    default_logger().set_level(level);
}

pub fn set_output<S: Sink + 'static>(sink: S) {
    default_logger().set_output(sink);
}

pub fn set_encoder<E: Encoder + 'static>(encoder: E) {
    default_logger().set_encoder(encoder);
}

pub fn set_report_caller(enabled: bool) {
    default_logger().set_report_caller(enabled);
}

pub fn add_hook<H: Hook + 'static>(hook: H) {
    default_logger().add_hook(hook);
}

pub fn with_fields(fields: Fields) -> Logger {
    default_logger().with_fields(fields)
}

pub fn with_context<C: ContextSource + ?Sized>(ctx: &C) -> Logger {
    default_logger().with_context(ctx)
}

pub fn with_redaction(enabled: bool) -> Logger {
    default_logger().with_redaction(enabled)
}

#[track_caller]
pub fn log(level: LogLevel, message: impl Into<String>) {
    default_logger().log(level, message);
}

#[track_caller]
pub fn log_with_fields(level: LogLevel, message: impl Into<String>, fields: Fields) {
    default_logger().log_with_fields(level, message, fields);
}

#[track_caller]
pub fn trace(message: impl Into<String>) {
    default_logger().trace(message);
}

#[track_caller]
pub fn debug(message: impl Into<String>) {
    default_logger().debug(message);
}

#[track_caller]
pub fn info(message: impl Into<String>) {
    default_logger().info(message);
}

#[track_caller]
pub fn warn(message: impl Into<String>) {
    default_logger().warn(message);
}

#[track_caller]
pub fn error(message: impl Into<String>) {
    default_logger().error(message);
}

pub fn flush() -> super::error::Result<()> {
    default_logger().flush()
}
