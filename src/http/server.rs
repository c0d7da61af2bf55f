//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request id, tracing, timeout, request metrics)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServiceConfig;
use crate::downstream::{DownstreamClient, CHAIN_PATH};
use crate::http::handlers::{self, AppState};
use crate::http::middleware::track_requests;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics::{MetricsRegistry, RequestCounter};
use crate::observability::tracing::http_trace_layer;

/// HTTP server for one demo tier.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server recording into `registry`.
    pub fn new(config: ServiceConfig, registry: &MetricsRegistry) -> Self {
        let downstream = config.tier.downstream.as_ref().map(|url| {
            DownstreamClient::new(
                url.clone(),
                Duration::from_secs(config.timeouts.downstream_secs),
            )
        });

        let state = AppState {
            tier: Arc::from(config.tier.name.as_str()),
            downstream,
        };

        let router = Self::build_router(&config, state, registry.counter());
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request counter wraps the fallback as well, so unknown paths are
    /// counted under their raw path before being answered with 404.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState, counter: RequestCounter) -> Router {
        Router::new()
            .route("/", get(handlers::hello))
            .route("/date", get(handlers::date))
            .route(CHAIN_PATH, get(handlers::chain))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(counter, track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(http_trace_layer())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %listener.local_addr()?,
            tier = %self.config.tier.name,
            downstream = ?self.config.tier.downstream,
            "HTTP server starting"
        );

        serve(listener, self.router, shutdown).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Serve `router` on `listener` with graceful shutdown.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;

    fn server() -> (HttpServer, MetricsRegistry) {
        let registry = MetricsRegistry::new();
        (HttpServer::new(ServiceConfig::default(), &registry), registry)
    }

    #[tokio::test]
    async fn test_hello_route() {
        let (server, _) = server();

        let response = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Hello World");
    }

    #[tokio::test]
    async fn test_request_id_is_assigned_and_echoed() {
        let (server, _) = server();

        let generated = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(generated.headers().contains_key(X_REQUEST_ID));

        let supplied = server
            .router()
            .oneshot(
                Request::get("/")
                    .header(X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(supplied.headers()[X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_router_records_into_registry() {
        let (server, registry) = server();

        for uri in ["/", "/date", "/date", "/nope"] {
            server
                .router()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
        }

        let rendered = registry.render();
        for line in [
            r#"http_requests_total{method="GET",route="/"} 1"#,
            r#"http_requests_total{method="GET",route="/date"} 2"#,
            r#"http_requests_total{method="GET",route="/nope"} 1"#,
        ] {
            assert!(rendered.lines().any(|l| l == line), "missing {line} in:\n{rendered}");
        }
    }
}
