//! HTTP plumbing shared by the outbound hooks
//!
//! `HttpTransport` abstracts the POST itself so hooks can be exercised with
//! a recording transport in tests. `AsyncDispatcher` moves requests onto a
//! worker thread through a bounded channel; when the channel is full the
//! request is dropped and an alert is raised.

use super::Diagnostics;
use crate::core::{Encoder, Entry, ErrorCallback, Hook, JsonEncoder, LoggerError, Result};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Timeout of the generic HTTP hook
pub const HTTP_HOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout of the vendor hooks
pub const VENDOR_HOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of requests a dispatcher buffers
pub const DEFAULT_DISPATCH_CAPACITY: usize = 1024;

/// How long dropping a dispatcher waits for queued requests
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for posting JSON bodies.
///
/// This abstraction allows hooks to be tested with a mock transport.
pub trait HttpTransport: Send + Sync {
    /// POST `body` as `application/json` with the extra `headers`.
    ///
    /// Non-2xx responses are errors.
    fn post_json(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<()>;
}

/// Blocking reqwest client
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                LoggerError::config("ReqwestTransport", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl HttpTransport for ReqwestTransport {
    fn post_json(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<()> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_vec());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .map_err(|e| LoggerError::http(url, format!("POST request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LoggerError::http(
                url,
                format!("HTTP {} from POST", response.status()),
            ));
        }
        Ok(())
    }
}

/// Generic JSON-over-HTTP hook (Loki-like ingestion). Posts synchronously.
pub struct HttpHook {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
    encoder: JsonEncoder,
    diagnostics: Diagnostics,
}

impl HttpHook {
    /// Hook posting to `endpoint` with a 5 second timeout
    #[cfg(feature = "http")]
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(HTTP_HOOK_TIMEOUT)?;
        Ok(Self::with_transport(endpoint, Arc::new(transport)))
    }

    pub fn with_transport(endpoint: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            encoder: JsonEncoder::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Report failed requests to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.diagnostics.set(callback);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Hook for HttpHook {
    fn fire(&self, entry: &Entry) {
        let result = self
            .encoder
            .encode(entry)
            .and_then(|body| self.transport.post_json(&self.endpoint, &[], &body));
        if let Err(e) = result {
            self.diagnostics.report(&e);
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Counters of one dispatcher
#[derive(Debug, Default)]
pub struct DispatchStats {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl DispatchStats {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Requests discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

struct Request {
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// Background sender for hook requests
pub struct AsyncDispatcher {
    name: String,
    capacity: usize,
    sender: Option<Sender<Request>>,
    handle: Option<thread::JoinHandle<()>>,
    stats: Arc<DispatchStats>,
    diagnostics: Diagnostics,
}

impl AsyncDispatcher {
    /// Spawn the worker thread for `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new(
        name: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        capacity: usize,
    ) -> Result<Self> {
        let name = name.into();
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded::<Request>(capacity);
        let stats = Arc::new(DispatchStats::default());
        let worker_stats = Arc::clone(&stats);
        let diagnostics = Diagnostics::default();
        let worker_diagnostics = diagnostics.clone();

        let handle = thread::Builder::new()
            .name(format!("logx-{}", name))
            .spawn(move || {
                for request in receiver {
                    let headers: Vec<(&str, &str)> = request
                        .headers
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str()))
                        .collect();

                    match transport.post_json(&request.url, &headers, &request.body) {
                        Ok(()) => {
                            worker_stats.sent.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            worker_stats.failed.fetch_add(1, Ordering::Relaxed);
                            worker_diagnostics.report(&e);
                        }
                    }
                }
            })
            .map_err(|e| {
                LoggerError::io_operation("spawning dispatcher thread", name.clone(), e)
            })?;

        Ok(Self {
            name,
            capacity,
            sender: Some(sender),
            handle: Some(handle),
            stats,
            diagnostics,
        })
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Report failed requests and dropped batches to `callback` instead of stderr
    pub fn set_error_callback(&self, callback: ErrorCallback) {
        self.diagnostics.set(callback);
    }

    pub(crate) fn report(&self, error: &LoggerError) {
        self.diagnostics.report(error);
    }

    /// Queue a request without blocking
    pub fn dispatch(&self, url: &str, headers: &[(&str, &str)], body: Vec<u8>) {
        let Some(ref sender) = self.sender else {
            return;
        };

        let request = Request {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        };

        match sender.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped_count = self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                // Alert on first drop and periodically thereafter
                if dropped_count == 0 || (dropped_count + 1) % 1000 == 0 {
                    self.diagnostics
                        .report(&LoggerError::queue_full(&self.name, self.capacity));
                }
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Close the queue and wait up to `timeout` for pending requests.
    ///
    /// Returns `true` if the worker finished in time.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.handle.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!("[LOGGER ERROR] Dispatcher thread {} panicked", self.name);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Dispatcher {} did not finish within {:?}. \
                     Some requests may be lost.",
                    self.name, timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for AsyncDispatcher {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
