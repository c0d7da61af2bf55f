//! Multi-tier HTTP demo instrumented with request metrics.

pub mod config;
pub mod downstream;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{MetricsRegistry, RequestAttributes, RequestCounter};
