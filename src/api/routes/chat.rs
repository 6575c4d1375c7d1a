//! Chat Routes
//!
//! - GET /api/v1/chat - Current conversation
//! - POST /api/v1/chat - Send a message
//! - POST /api/v1/chat/reset - Start a new conversation
//! - GET /api/v1/chat/:index/audio - Narrate an assistant turn (audio/mpeg)

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ChatRequest, ChatResponse, ConversationResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/chat
pub async fn get_conversation(State(state): State<Arc<AppState>>) -> Json<ConversationResponse> {
    Json(ConversationResponse {
        turns: state.snapshot().conversation,
    })
}

/// POST /api/v1/chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let mut mirror = state.mirror.lock().await;
    let result = mirror.send_message(&req.message).await;
    state.publish(&mirror);
    let reply = result?;

    Ok(Json(ChatResponse {
        reply,
        turns: mirror.conversation().to_vec(),
    }))
}

/// POST /api/v1/chat/reset
pub async fn reset_conversation(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut mirror = state.mirror.lock().await;
    mirror.new_chat();
    state.publish(&mirror);
    StatusCode::NO_CONTENT
}

/// GET /api/v1/chat/:index/audio
pub async fn narrate(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<impl IntoResponse> {
    let audio = state.mirror.lock().await.narrate(index).await?;
    tracing::debug!(index, bytes = audio.len(), "Narration ready");

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
