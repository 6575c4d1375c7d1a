//! Health Routes
//!
//! Health check endpoints for monitoring.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (text service is usable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 503 until the text service has a credential; reflections and
/// chat would fail without one.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.text_service_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.snapshot().status;

    let (overall, text_service) = if state.text_service_ready {
        ("healthy", "ok")
    } else {
        ("degraded", "missing_credential")
    };

    Json(HealthResponse {
        status: overall.to_string(),
        text_service: text_service.to_string(),
        journal_entries: status.journal_entries,
        health_records: status.health_records,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
