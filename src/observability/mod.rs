//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → metrics.rs (http_requests_total sample, via the request metrics middleware)
//!     → tracing.rs (span with method, path, request id)
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → Metrics endpoint (Prometheus scrape, separate listener)
//!     → Log aggregation (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments) and never fail a request
//! - Request ID flows through all tiers
//! - The metrics registry is an explicit value, not a global recorder

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::{MetricsRegistry, RequestAttributes, RequestCounter};
