//! Journal Routes
//!
//! - GET /api/v1/moods - Mood vocabulary
//! - POST /api/v1/reflect - Generate and record a weekly reflection
//! - GET /api/v1/history - Durable journal history
//! - GET|PUT /api/v1/settings - Style modifier

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HistoryResponse, MoodDto, SettingsDto};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::journal::Mood;
use crate::mirror::{ReflectRequest, Reflection};

/// GET /api/v1/moods
pub async fn list_moods() -> Json<Vec<MoodDto>> {
    Json(Mood::ALL.into_iter().map(MoodDto::from).collect())
}

/// POST /api/v1/reflect
pub async fn reflect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReflectRequest>,
) -> ApiResult<(StatusCode, Json<Reflection>)> {
    let mut mirror = state.mirror.lock().await;
    let result = mirror.reflect(req).await;
    state.publish(&mirror);

    Ok((StatusCode::CREATED, Json(result?)))
}

/// GET /api/v1/history
pub async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let entries = state.snapshot().history;

    Json(HistoryResponse {
        count: entries.len(),
        entries,
    })
}

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsDto> {
    Json(SettingsDto {
        style_modifier: state.snapshot().status.style_modifier,
    })
}

/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SettingsDto>,
) -> Json<SettingsDto> {
    let mut mirror = state.mirror.lock().await;
    mirror.set_style_modifier(req.style_modifier);
    state.publish(&mirror);
    drop(mirror);

    tracing::info!(style_modifier = req.style_modifier, "Settings updated");
    Json(req)
}
