//! Request handlers for the demo routes.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::downstream::DownstreamClient;
use crate::http::request::X_REQUEST_ID;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub tier: Arc<str>,
    pub downstream: Option<DownstreamClient>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DateResponse {
    pub date: String,
}

/// Report returned by `/chain`; `downstream` nests the next tier's report.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainReport {
    pub tier: String,
    pub downstream: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainFailure {
    pub tier: String,
    pub error: String,
}

pub async fn hello() -> &'static str {
    "Hello World"
}

pub async fn date() -> Json<DateResponse> {
    Json(DateResponse {
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Walk the tier chain: ask the downstream tier (if any) for its report and
/// wrap it in ours.
pub async fn chain(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let tier = state.tier.to_string();

    let Some(downstream) = &state.downstream else {
        return Json(ChainReport { tier, downstream: None }).into_response();
    };

    match downstream.fetch_chain(headers.get(X_REQUEST_ID)).await {
        Ok(report) => Json(ChainReport {
            tier,
            downstream: Some(report),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(
                tier = %tier,
                downstream = %downstream.base_url(),
                error = %e,
                "Downstream call failed"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(ChainFailure {
                    tier,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
