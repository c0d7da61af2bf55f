//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the metrics registry
//! - Bind the scrape endpoint (the metrics sink)
//! - Bind the service listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Service listener binds last, so no request is ever served before the
//!   counter and its sink exist

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::http::scrape::scrape_router;
use crate::http::server::{serve, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::MetricsRegistry;

/// Errors that prevent the service from accepting traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind scrape endpoint on {address}: {source}")]
    MetricsBind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to bind service listener on {address}: {source}")]
    ServiceBind {
        address: String,
        source: std::io::Error,
    },
}

/// Handles to a started service.
#[derive(Debug)]
pub struct RunningService {
    /// Address the service listener is bound to.
    pub service_addr: SocketAddr,
    /// Address of the scrape endpoint, if enabled.
    pub metrics_addr: Option<SocketAddr>,
    /// The registry requests are recorded into.
    pub registry: MetricsRegistry,
    tasks: Vec<JoinHandle<std::io::Result<()>>>,
}

impl RunningService {
    /// Wait for every server task to finish (after shutdown was triggered).
    pub async fn wait(self) -> std::io::Result<()> {
        for task in self.tasks {
            match task.await {
                Ok(result) => result?,
                Err(e) => tracing::error!(error = %e, "Server task aborted"),
            }
        }
        Ok(())
    }
}

/// Start the scrape endpoint and the service, in that order.
pub async fn start(config: ServiceConfig, shutdown: &Shutdown) -> Result<RunningService, StartupError> {
    let registry = MetricsRegistry::new();
    let mut tasks = Vec::new();

    let metrics_addr = if config.observability.metrics_enabled {
        let address = config.observability.metrics_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::MetricsBind { address: address.clone(), source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| StartupError::MetricsBind { address, source })?;

        tracing::info!(
            "prometheus scrape endpoint: http://{}{}",
            addr,
            config.observability.metrics_path
        );

        let router = scrape_router(&config.observability.metrics_path, registry.clone());
        tasks.push(tokio::spawn(serve(listener, router, shutdown.subscribe())));
        Some(addr)
    } else {
        tracing::warn!("Metrics endpoint disabled");
        None
    };

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::ServiceBind { address: address.clone(), source })?;
    let service_addr = listener
        .local_addr()
        .map_err(|source| StartupError::ServiceBind { address, source })?;

    tracing::info!("Server is running on http://localhost:{}", service_addr.port());

    let server = HttpServer::new(config, &registry);
    tasks.push(tokio::spawn(server.run(listener, shutdown.subscribe())));

    Ok(RunningService {
        service_addr,
        metrics_addr,
        registry,
        tasks,
    })
}
