//! Logger metrics for observability
//!
//! Counters shared by a logger family: how many entries reached the sink,
//! how many were gated out by level, and how many were lost to encode or
//! write failures.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for one logger family
///
/// # Example
///
/// ```
/// use logx::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written();
/// metrics.record_encode_failure();
///
/// assert_eq!(metrics.written(), 1);
/// assert_eq!(metrics.dropped(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries whose bytes were handed to the sink
    written: AtomicU64,

    /// Calls rejected by the level gate
    filtered: AtomicU64,

    encode_failures: AtomicU64,

    write_failures: AtomicU64,

    /// Hooks that panicked while handling an entry
    hook_panics: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            hook_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn hook_panics(&self) -> u64 {
        self.hook_panics.load(Ordering::Relaxed)
    }

    /// Entries that passed the level gate but never reached the sink
    pub fn dropped(&self) -> u64 {
        self.encode_failures() + self.write_failures()
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_encode_failure(&self) -> u64 {
        self.encode_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_hook_panic(&self) -> u64 {
        self.hook_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing passed the level gate yet.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped() as f64;
        let total = self.written() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.encode_failures.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.hook_panics.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            written: AtomicU64::new(self.written()),
            filtered: AtomicU64::new(self.filtered()),
            encode_failures: AtomicU64::new(self.encode_failures()),
            write_failures: AtomicU64::new(self.write_failures()),
            hook_panics: AtomicU64::new(self.hook_panics()),
        }
    }
}
