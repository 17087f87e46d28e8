//! Outbound hooks
//!
//! Provides:
//! - `FileHook`: JSON lines appended to a file
//! - `RotationHook`: JSON lines with size-based rotation and gzip backups
//! - `HttpHook`: synchronous JSON POST to a generic ingestion endpoint
//! - `DataDogHook`, `LogglyHook`, `NewRelicHook`, `AtatusHook`: vendor
//!   payloads posted from a background dispatcher
//!
//! Hook failures never reach the caller of `log()`. Each hook reports them
//! to the callback given with `with_error_callback`, or to stderr with the
//! same prefixes the logger uses when none is set.

pub mod file;
pub mod http;
pub mod rotation;
pub mod vendors;

pub use file::FileHook;
pub use http::{AsyncDispatcher, DispatchStats, HttpHook, HttpTransport};
#[cfg(feature = "http")]
pub use http::ReqwestTransport;
pub use rotation::RotationHook;
pub use vendors::{AtatusHook, DataDogHook, LogglyHook, NewRelicHook};

use crate::core::{ErrorCallback, LoggerError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Destination of one hook's internal failures, shared with its worker
#[derive(Clone, Default)]
pub(crate) struct Diagnostics(Arc<RwLock<Option<ErrorCallback>>>);

impl Diagnostics {
    pub(crate) fn set(&self, callback: ErrorCallback) {
        *self.0.write() = Some(callback);
    }

    pub(crate) fn report(&self, error: &LoggerError) {
        let callback = self.0.read().clone();
        match callback {
            Some(callback) => callback(error),
            None => eprintln!("{} {}", error.severity_tag(), error),
        }
    }
}
