//! HTTP client for the next tier in the chain.

use std::time::Duration;

use axum::{
    body::Body,
    http::{uri::InvalidUri, HeaderValue, Method, Request, Response, StatusCode, Uri},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;
use thiserror::Error;

use crate::http::request::X_REQUEST_ID;

/// Largest downstream body accepted.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Path every tier exposes its chain report on.
pub const CHAIN_PATH: &str = "/chain";

/// Failures talking to the downstream tier.
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("invalid downstream uri: {0}")]
    InvalidUri(#[from] InvalidUri),

    #[error("failed to build downstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("downstream unreachable: {0}")]
    Unreachable(#[from] hyper_util::client::legacy::Error),

    #[error("downstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("downstream responded with {0}")]
    Status(StatusCode),

    #[error("failed to read downstream body: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid downstream payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Client bound to one downstream base URL.
#[derive(Clone)]
pub struct DownstreamClient {
    base_url: String,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl DownstreamClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8081`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        }
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the downstream tier's chain report.
    ///
    /// `request_id` is forwarded so all tiers log the same id.
    pub async fn fetch_chain(
        &self,
        request_id: Option<&HeaderValue>,
    ) -> Result<Value, DownstreamError> {
        let uri: Uri = format!("{}{}", self.base_url, CHAIN_PATH).parse()?;

        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(id) = request_id {
            builder = builder.header(X_REQUEST_ID, id.clone());
        }
        let request = builder.body(Body::empty())?;

        tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| DownstreamError::Timeout(self.timeout))?
    }

    async fn exchange(&self, request: Request<Body>) -> Result<Value, DownstreamError> {
        let response: Response<Incoming> = self.client.request(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownstreamError::Status(status));
        }

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl std::fmt::Debug for DownstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
