//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Own the request counter instrument
//! - Record one sample per inbound request, keyed by method and route
//! - Render all instruments in the Prometheus text format for scraping
//!
//! # Metrics
//! - `http_requests_total` (counter): total requests by method, route
//!
//! # Design Decisions
//! - The recorder is built per registry and never installed globally;
//!   handles are passed explicitly to whoever needs them
//! - Each series is an atomic inside the recorder, so increments from
//!   concurrent requests never lose updates and rendering never blocks them
//! - Route labels are raw request paths; parameterized routes would grow
//!   one series per distinct path

use std::fmt;
use std::sync::Arc;

use metrics::{Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

/// Name of the request counter.
pub const REQUESTS_TOTAL: &str = "http_requests_total";

/// Help text rendered alongside the request counter.
pub const REQUESTS_TOTAL_DESCRIPTION: &str = "Count all incoming requests";

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Labels distinguishing one request series from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestAttributes {
    /// HTTP verb, verbatim.
    pub method: String,
    /// Request path, verbatim.
    pub route: String,
}

impl RequestAttributes {
    pub fn new(method: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            route: route.into(),
        }
    }

    fn labels(&self) -> Vec<Label> {
        vec![
            Label::new("method", self.method.clone()),
            Label::new("route", self.route.clone()),
        ]
    }
}

/// Handle to the `http_requests_total` counter.
///
/// Cheap to clone; all clones feed the same registry.
#[derive(Clone)]
pub struct RequestCounter {
    recorder: Arc<PrometheusRecorder>,
}

impl RequestCounter {
    /// Add `value` to the series identified by `attributes`.
    pub fn add(&self, value: u64, attributes: &RequestAttributes) {
        let key = Key::from_parts(REQUESTS_TOTAL, attributes.labels());
        self.recorder.register_counter(&key, &METADATA).increment(value);
    }
}

impl fmt::Debug for RequestCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCounter")
            .field("name", &REQUESTS_TOTAL)
            .finish()
    }
}

/// Registry owning the process's instruments.
///
/// Construct once at startup, before any listener accepts traffic, and hand
/// clones to the middleware and the scrape endpoint.
#[derive(Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
    requests: RequestCounter,
}

impl MetricsRegistry {
    /// Build the recorder and describe the request counter.
    pub fn new() -> Self {
        let recorder = Arc::new(PrometheusBuilder::new().build_recorder());
        recorder.describe_counter(
            KeyName::from_const_str(REQUESTS_TOTAL),
            None,
            REQUESTS_TOTAL_DESCRIPTION.into(),
        );

        tracing::debug!(metric = REQUESTS_TOTAL, "Request counter registered");

        Self {
            handle: recorder.handle(),
            requests: RequestCounter { recorder },
        }
    }

    /// The shared request counter.
    pub fn counter(&self) -> RequestCounter {
        self.requests.clone()
    }

    /// Render every instrument in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("requests", &self.requests)
            .finish()
    }
}
