//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths and the downstream URL
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Uri;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.metrics_address {0} collides with the service listener")]
    MetricsAddressCollision(SocketAddr),

    #[error("observability.metrics_path must start with '/' (got {0:?})")]
    InvalidMetricsPath(String),

    #[error("tier.name must not be empty")]
    EmptyTierName,

    #[error("tier.downstream {0:?} is not an absolute http:// URL")]
    InvalidDownstream(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind_address = config.listener.bind_address();
    let service_addr = match bind_address.parse::<SocketAddr>() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidBindAddress(bind_address));
            None
        }
    };

    let observability = &config.observability;
    if observability.metrics_enabled {
        match observability.metrics_address.parse::<SocketAddr>() {
            Ok(metrics_addr) => {
                if service_addr.is_some_and(|service| collides(service, metrics_addr)) {
                    errors.push(ValidationError::MetricsAddressCollision(metrics_addr));
                }
            }
            Err(_) => errors.push(ValidationError::InvalidMetricsAddress(
                observability.metrics_address.clone(),
            )),
        }

        if !observability.metrics_path.starts_with('/') {
            errors.push(ValidationError::InvalidMetricsPath(
                observability.metrics_path.clone(),
            ));
        }
    }

    if config.tier.name.trim().is_empty() {
        errors.push(ValidationError::EmptyTierName);
    }

    if let Some(downstream) = &config.tier.downstream {
        if !is_http_base_url(downstream) {
            errors.push(ValidationError::InvalidDownstream(downstream.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.downstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("downstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Two listeners collide when they share a fixed port on overlapping IPs.
/// Port 0 asks the OS for a fresh port and never collides.
fn collides(a: SocketAddr, b: SocketAddr) -> bool {
    if a.port() == 0 || a.port() != b.port() {
        return false;
    }
    a.ip() == b.ip() || a.ip().is_unspecified() || b.ip().is_unspecified()
}

fn is_http_base_url(value: &str) -> bool {
    match value.parse::<Uri>() {
        Ok(uri) => uri.scheme_str() == Some("http") && uri.authority().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.host = "not an ip".into();
        config.observability.metrics_address = "nowhere".into();
        config.observability.metrics_path = "metrics".into();
        config.tier.name = "  ".into();
        config.tier.downstream = Some("ftp://example.com".into());
        config.timeouts.request_secs = 0;
        config.timeouts.downstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("not an ip:8080".into()),
                ValidationError::InvalidMetricsAddress("nowhere".into()),
                ValidationError::InvalidMetricsPath("metrics".into()),
                ValidationError::EmptyTierName,
                ValidationError::InvalidDownstream("ftp://example.com".into()),
                ValidationError::ZeroTimeout("request_secs"),
                ValidationError::ZeroTimeout("downstream_secs"),
            ]
        );
    }

    #[test]
    fn test_metrics_on_service_port_is_rejected() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "127.0.0.1:8080".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MetricsAddressCollision("127.0.0.1:8080".parse().unwrap())]
        );
    }

    #[test]
    fn test_ephemeral_ports_never_collide() {
        let mut config = ServiceConfig::default();
        config.listener.host = "127.0.0.1".into();
        config.listener.port = 0;
        config.observability.metrics_address = "127.0.0.1:0".into();

        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_disabled_metrics_skip_scrape_checks() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "garbage".into();
        config.observability.metrics_path = String::new();

        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_downstream_urls() {
        assert!(is_http_base_url("http://127.0.0.1:8081"));
        assert!(is_http_base_url("http://middle:8080/"));
        assert!(!is_http_base_url("https://middle:8080"));
        assert!(!is_http_base_url("/chain"));
        assert!(!is_http_base_url("middle:8080"));
    }
}
