//! Health Data Routes
//!
//! - POST /api/v1/health-data - Upload a health CSV table
//! - DELETE /api/v1/health-data - Forget the loaded table
//! - GET /api/v1/summary?week_start=YYYY-MM-DD - Weekly health summary

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{HealthDataResponse, HealthDataUpload, SummaryQuery, SummaryResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::health::{read_csv_str, WeeklyWindow};

/// POST /api/v1/health-data
pub async fn upload_health_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HealthDataUpload>,
) -> ApiResult<Json<HealthDataResponse>> {
    if req.csv.trim().is_empty() {
        return Err(ApiError::InputMissing(
            "Please upload your health data CSV.".to_string(),
        ));
    }

    let records = read_csv_str(&req.csv)?;
    let response = HealthDataResponse::from_records(&records);
    let mut mirror = state.mirror.lock().await;
    mirror.load_health_records(records);
    state.publish(&mirror);

    Ok(Json(response))
}

/// DELETE /api/v1/health-data
pub async fn clear_health_data(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut mirror = state.mirror.lock().await;
    mirror.clear_health_data();
    state.publish(&mirror);
    drop(mirror);
    tracing::info!("Health data cleared");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/summary
pub async fn weekly_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = state.mirror.lock().await.weekly_summary(query.week_start)?;

    Ok(Json(SummaryResponse {
        window: WeeklyWindow::starting(query.week_start),
        rendered: summary.render(),
        summary,
    }))
}
