//! Automatic request instrumentation.
//!
//! # Responsibilities
//! - Open one span per request carrying method, path and request id
//! - Log request completion with status and latency
//!
//! # Design Decisions
//! - Built on `tower_http::trace`, so handlers get spans without code changes
//! - The request id is read from `x-request-id`, which the request id layer
//!   has already set by the time this layer runs

use axum::http::Request;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::{Level, Span};

use crate::http::request::RequestIdExt;

/// Span factory for inbound requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .request_id()
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    }
}

/// Trace layer for the service router.
pub fn http_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
