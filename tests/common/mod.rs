//! Shared utilities for integration testing.

use std::net::SocketAddr;

use telemetry_demo::config::ServiceConfig;
use telemetry_demo::lifecycle::{self, RunningService, Shutdown};

/// A tier running on ephemeral local ports.
pub struct TestTier {
    pub service: RunningService,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestTier {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.service.service_addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.service.service_addr)
    }

    pub fn metrics_url(&self) -> String {
        let addr: SocketAddr = self.service.metrics_addr.expect("metrics enabled");
        format!("http://{}/metrics", addr)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.service.wait().await.unwrap();
    }
}

/// Config bound to 127.0.0.1 with OS-assigned ports.
pub fn local_config(tier: &str, downstream: Option<String>) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.observability.metrics_address = "127.0.0.1:0".into();
    config.tier.name = tier.into();
    config.tier.downstream = downstream;
    config
}

/// Start a tier with the given config.
pub async fn start_tier(config: ServiceConfig) -> TestTier {
    let shutdown = Shutdown::new();
    let service = lifecycle::start(config, &shutdown).await.unwrap();
    TestTier { service, shutdown }
}

/// HTTP client that bypasses any system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Value of one series in Prometheus exposition text, if present.
#[allow(dead_code)]
pub fn sample(exposition: &str, series: &str) -> Option<u64> {
    exposition.lines().find_map(|line| {
        let value = line.strip_prefix(series)?.strip_prefix(' ')?;
        value.trim().parse().ok()
    })
}

/// Fetch the tier's scrape endpoint.
pub async fn scrape(client: &reqwest::Client, tier: &TestTier) -> String {
    let res = client.get(tier.metrics_url()).send().await.unwrap();
    assert!(res.status().is_success());
    res.text().await.unwrap()
}
