//! Multi-tier HTTP demo (v1)
//!
//! One process is one tier. Tiers are chained through `tier.downstream`;
//! every tier counts its requests and exposes them for Prometheus.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                        TIER                          │
//!                 │                                                      │
//!   Client ───────┼─▶ request id ─▶ trace ─▶ request metrics ─▶ handlers │
//!                 │                              │                │     │
//!                 │                              ▼                ▼     │
//!                 │                    ┌──────────────────┐  downstream ┼──▶ next tier
//!                 │                    │ MetricsRegistry  │   client    │
//!                 │                    │ http_requests_   │             │
//!                 │                    │ total{method,    │             │
//!                 │                    │       route}     │             │
//!                 │                    └────────┬─────────┘             │
//!                 │                             ▼                       │
//!   Prometheus ◀──┼──────────────────── scrape endpoint (:9464/metrics) │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use telemetry_demo::config;
use telemetry_demo::lifecycle::{self, signals, Shutdown};
use telemetry_demo::observability::logging;

#[derive(Parser)]
#[command(name = "telemetry-demo")]
#[command(about = "One tier of the instrumented multi-tier HTTP demo", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("telemetry-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        tier = %config.tier.name,
        downstream = ?config.tier.downstream,
        metrics_enabled = config.observability.metrics_enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let service = lifecycle::start(config, &shutdown).await?;

    signals::wait_for_signal().await;
    shutdown.trigger();
    service.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
