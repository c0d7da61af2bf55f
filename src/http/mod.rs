//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (assign / keep x-request-id)
//!     → observability::tracing (request span)
//!     → middleware/request_metrics.rs (count method + path, always continue)
//!     → handlers.rs (/, /date, /chain, 404 fallback)
//!     → Send to client
//!
//! Scrape listener
//!     → scrape.rs (GET /metrics, Prometheus text format)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod scrape;
pub mod server;

pub use handlers::AppState;
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
