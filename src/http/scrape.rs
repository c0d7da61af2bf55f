//! Prometheus scrape endpoint.
//!
//! Served on its own listener so scrapes never queue behind service traffic.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::observability::metrics::MetricsRegistry;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Router answering `GET {path}` with the current metric values.
pub fn scrape_router(path: &str, registry: MetricsRegistry) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(registry)
}

#[tracing::instrument(skip_all, name = "metrics.scrape")]
async fn render_metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        registry.render(),
    )
}
