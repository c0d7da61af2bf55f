//! Request counting middleware.
//!
//! Records every request in `http_requests_total` before handing it on.
//! The middleware never rejects, delays or inspects a response, and a
//! recorded sample is never retracted if the handler later fails or the
//! request is cancelled.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics::{RequestAttributes, RequestCounter};

/// Count the request under its method and raw path, then continue.
pub async fn track_requests(
    State(counter): State<RequestCounter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let attributes = RequestAttributes::new(request.method().as_str(), request.uri().path());
    counter.add(1, &attributes);

    tracing::trace!(
        method = %attributes.method,
        route = %attributes.route,
        "Request counted"
    );

    next.run(request).await
}
