//! Mood Mirror REST API
//!
//! HTTP API layer for the mirror, built with Axum. Each endpoint is one
//! named user action.
//!
//! # Endpoints
//!
//! ## Health data
//! - `POST /api/v1/health-data` - Upload a health CSV table
//! - `DELETE /api/v1/health-data` - Forget the loaded table
//! - `POST /api/v1/import/apple-health` - Import an Apple Health export
//! - `GET /api/v1/summary?week_start=` - Weekly health summary
//!
//! ## Journal
//! - `GET /api/v1/moods` - Mood vocabulary
//! - `POST /api/v1/reflect` - Generate a weekly reflection
//! - `GET /api/v1/history` - Journal history
//! - `GET /api/v1/settings` - Current settings
//! - `PUT /api/v1/settings` - Toggle the style modifier
//!
//! ## Chat
//! - `GET /api/v1/chat` - Current conversation
//! - `POST /api/v1/chat` - Send a message
//! - `POST /api/v1/chat/reset` - Start a new conversation
//! - `GET /api/v1/chat/:index/audio` - Narrate an assistant turn
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use moodmirror::api::{serve, ApiConfig, AppState};
//! use moodmirror::journal::{JournalStore, ReflectionSession};
//! use moodmirror::mirror::MoodMirror;
//! use moodmirror::services::{GeminiClient, GeminiConfig, TranslateTtsClient, TtsConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = ReflectionSession::open(JournalStore::open("journal_history.json")?)?;
//!     let generator = Arc::new(GeminiClient::new(GeminiConfig::default())?);
//!     let narrator = Arc::new(TranslateTtsClient::new(TtsConfig::default())?);
//!     let mirror = MoodMirror::new(session, generator, narrator, "en");
//!
//!     let config = ApiConfig::default();
//!     serve(AppState::new(mirror, config.clone()), &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState, MirrorSnapshot};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        // Health data routes
        .route(
            "/health-data",
            post(routes::health_data::upload_health_data)
                .delete(routes::health_data::clear_health_data),
        )
        .route("/summary", get(routes::health_data::weekly_summary))
        // Journal routes
        .route("/moods", get(routes::journal::list_moods))
        .route("/reflect", post(routes::journal::reflect))
        .route("/history", get(routes::journal::history))
        .route(
            "/settings",
            get(routes::journal::get_settings).put(routes::journal::update_settings),
        )
        // Chat routes
        .route(
            "/chat",
            get(routes::chat::get_conversation).post(routes::chat::send_message),
        )
        .route("/chat/reset", post(routes::chat::reset_conversation))
        .route("/chat/:index/audio", get(routes::chat::narrate))
        // Import routes - exports can be large
        .route(
            "/import/apple-health",
            post(routes::apple_health::import_apple_health),
        )
        .layer(DefaultBodyLimit::max(max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Mood Mirror API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Mood Mirror API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
