//! Vendor hooks: DataDog, Loggly, New Relic and Atatus
//!
//! Each hook maps an entry onto the vendor's payload shape and hands the
//! request to an [`AsyncDispatcher`], so `fire` never waits on the network.

use super::http::{AsyncDispatcher, HttpTransport, DEFAULT_DISPATCH_CAPACITY};
#[cfg(feature = "http")]
use super::http::{ReqwestTransport, VENDOR_HOOK_TIMEOUT};
use crate::core::{Entry, ErrorCallback, Hook, Result};
use chrono::SecondsFormat;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Service name reported by default
pub const DEFAULT_SERVICE: &str = "logx-app";

const LANGUAGE: &str = "rust";

/// Endpoint, headers and dispatcher shared by the vendor hooks
struct VendorClient {
    endpoint: String,
    headers: Vec<(String, String)>,
    dispatcher: AsyncDispatcher,
}

impl VendorClient {
    fn new(
        name: &str,
        endpoint: String,
        headers: Vec<(String, String)>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        Ok(Self {
            endpoint,
            headers,
            dispatcher: AsyncDispatcher::new(name, transport, DEFAULT_DISPATCH_CAPACITY)?,
        })
    }

    fn send(&self, payload: &Value) {
        match serde_json::to_vec(payload) {
            Ok(body) => {
                let headers: Vec<(&str, &str)> = self
                    .headers
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                self.dispatcher.dispatch(&self.endpoint, &headers, body);
            }
            Err(e) => self.dispatcher.report(&e.into()),
        }
    }
}

/// Base object with the entry's fields merged in; fields win over the
/// fixed keys, trace and caller keys are added last.
fn vendor_payload(
    mut base: Map<String, Value>,
    entry: &Entry,
    trace_key: &str,
    span_key: &str,
) -> Map<String, Value> {
    for (key, value) in &entry.fields {
        base.insert(key.clone(), value.to_json_value());
    }
    if let Some(ref trace_id) = entry.trace_id {
        base.insert(trace_key.to_string(), Value::String(trace_id.clone()));
    }
    if let Some(ref span_id) = entry.span_id {
        base.insert(span_key.to_string(), Value::String(span_id.clone()));
    }
    if let Some(ref caller) = entry.caller {
        base.insert("caller".to_string(), Value::String(caller.clone()));
    }
    base
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Sends entries to DataDog's HTTP intake
pub struct DataDogHook {
    service: String,
    client: VendorClient,
}

impl DataDogHook {
    /// Region `"eu"` selects the EU intake; anything else the US one.
    #[cfg(feature = "http")]
    pub fn new(api_key: &str, region: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(VENDOR_HOOK_TIMEOUT)?;
        Self::with_transport(api_key, region, Arc::new(transport))
    }

    pub fn with_transport(
        api_key: &str,
        region: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let endpoint = if region == "eu" {
            format!("https://http-intake.logs.eu.datadoghq.com/v1/input/{}", api_key)
        } else {
            format!("https://http-intake.logs.datadoghq.com/v1/input/{}", api_key)
        };

        Ok(Self {
            service: DEFAULT_SERVICE.to_string(),
            client: VendorClient::new("datadog", endpoint, Vec::new(), transport)?,
        })
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Report failed and dropped requests to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.client.dispatcher.set_error_callback(callback);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.client.endpoint
    }

    pub fn payload(&self, entry: &Entry) -> Value {
        let base = object(json!({
            "timestamp": entry.time.timestamp() * 1000,
            "level": entry.level.to_str(),
            "message": entry.message,
            "service": self.service,
            "source": LANGUAGE,
        }));
        Value::Object(vendor_payload(base, entry, "dd.trace_id", "dd.span_id"))
    }
}

impl Hook for DataDogHook {
    fn fire(&self, entry: &Entry) {
        self.client.send(&self.payload(entry));
    }

    fn name(&self) -> &str {
        "datadog"
    }
}

/// Sends entries to Loggly's tagged HTTP input
pub struct LogglyHook {
    service: String,
    client: VendorClient,
}

impl LogglyHook {
    #[cfg(feature = "http")]
    pub fn new(token: &str, tag: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(VENDOR_HOOK_TIMEOUT)?;
        Self::with_transport(token, tag, Arc::new(transport))
    }

    pub fn with_transport(
        token: &str,
        tag: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let endpoint = format!("https://logs-01.loggly.com/inputs/{}/tag/{}/", token, tag);
        Ok(Self {
            service: DEFAULT_SERVICE.to_string(),
            client: VendorClient::new("loggly", endpoint, Vec::new(), transport)?,
        })
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Report failed and dropped requests to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.client.dispatcher.set_error_callback(callback);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.client.endpoint
    }

    pub fn payload(&self, entry: &Entry) -> Value {
        let base = object(json!({
            "timestamp": entry.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            "level": entry.level.to_str(),
            "message": entry.message,
            "service": self.service,
            "language": LANGUAGE,
        }));
        Value::Object(vendor_payload(base, entry, "trace_id", "span_id"))
    }
}

impl Hook for LogglyHook {
    fn fire(&self, entry: &Entry) {
        self.client.send(&self.payload(entry));
    }

    fn name(&self) -> &str {
        "loggly"
    }
}

/// Sends entries to the New Relic Log API
pub struct NewRelicHook {
    service: String,
    client: VendorClient,
}

impl NewRelicHook {
    /// Region `"eu"` selects the EU endpoint; anything else the US one.
    #[cfg(feature = "http")]
    pub fn new(license_key: &str, region: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(VENDOR_HOOK_TIMEOUT)?;
        Self::with_transport(license_key, region, Arc::new(transport))
    }

    pub fn with_transport(
        license_key: &str,
        region: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let endpoint = if region == "eu" {
            "https://log-api.eu.newrelic.com/log/v1"
        } else {
            "https://log-api.newrelic.com/log/v1"
        };
        let headers = vec![("Api-Key".to_string(), license_key.to_string())];

        Ok(Self {
            service: DEFAULT_SERVICE.to_string(),
            client: VendorClient::new("newrelic", endpoint.to_string(), headers, transport)?,
        })
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Report failed and dropped requests to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.client.dispatcher.set_error_callback(callback);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.client.endpoint
    }

    /// The Log API takes an array of log objects
    pub fn payload(&self, entry: &Entry) -> Value {
        let base = object(json!({
            "timestamp": entry.time.timestamp_millis(),
            "level": entry.level.to_str(),
            "message": entry.message,
            "service": self.service,
            "language": LANGUAGE,
        }));
        Value::Array(vec![Value::Object(vendor_payload(
            base, entry, "trace.id", "span.id",
        ))])
    }
}

impl Hook for NewRelicHook {
    fn fire(&self, entry: &Entry) {
        self.client.send(&self.payload(entry));
    }

    fn name(&self) -> &str {
        "newrelic"
    }
}

/// Sends entries to the Atatus logs API
pub struct AtatusHook {
    app_name: String,
    client: VendorClient,
}

impl AtatusHook {
    #[cfg(feature = "http")]
    pub fn new(license_key: &str, app_name: &str) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(VENDOR_HOOK_TIMEOUT)?;
        Self::with_transport(license_key, app_name, Arc::new(transport))
    }

    pub fn with_transport(
        license_key: &str,
        app_name: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", license_key),
        )];

        Ok(Self {
            app_name: app_name.to_string(),
            client: VendorClient::new(
                "atatus",
                "https://api.atatus.com/api/v1/logs".to_string(),
                headers,
                transport,
            )?,
        })
    }

    /// Report failed and dropped requests to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.client.dispatcher.set_error_callback(callback);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.client.endpoint
    }

    pub fn payload(&self, entry: &Entry) -> Value {
        let base = object(json!({
            "timestamp": entry.time.to_rfc3339_opts(SecondsFormat::Nanos, true),
            "level": entry.level.to_str(),
            "message": entry.message,
            "app": self.app_name,
            "language": LANGUAGE,
        }));
        Value::Object(vendor_payload(base, entry, "trace_id", "span_id"))
    }
}

impl Hook for AtatusHook {
    fn fire(&self, entry: &Entry) {
        self.client.send(&self.payload(entry));
    }

    fn name(&self) -> &str {
        "atatus"
    }
}
