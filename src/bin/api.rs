//! Mood Mirror API Server
//!
//! Run with: cargo run --bin moodmirror-api
//!
//! # Configuration
//!
//! Read from `~/.config/moodmirror/config.toml` or `./config.toml`, then
//! overridden by environment variables:
//! - `MOODMIRROR_HISTORY_FILE`: Journal history file (default: journal_history.json)
//! - `MOODMIRROR_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `MOODMIRROR_API_PORT`: Port to listen on (default: 8501)
//! - `MOODMIRROR_MODEL`: Generative model (default: gemini-2.0-flash)
//! - `MOODMIRROR_TTS_LANGUAGE`: Narration language (default: en)
//! - `MOODMIRROR_LOG_FORMAT`: pretty or json
//! - `GEMINI_API_KEY`: Credential for the generative-text service
//! - `RUST_LOG`: Log filter (default: moodmirror=info)

use moodmirror::api::{serve, AppState};
use moodmirror::config::{Config, LoggingConfig};
use moodmirror::journal::{JournalStore, ReflectionSession};
use moodmirror::mirror::MoodMirror;
use moodmirror::services::{GeminiClient, TranslateTtsClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Mood Mirror API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Journal history: {:?}", config.journal.history_file);

    // Opening the store takes the single-writer lock
    let store = JournalStore::open(&config.journal.history_file)?;
    let session = ReflectionSession::open(store)?;
    tracing::info!(entries = session.history().len(), "Journal history loaded");

    let generator = GeminiClient::new(config.gemini_config())?;
    let text_service_ready = generator.has_api_key();
    tracing::info!(model = %config.gemini.model, ready = text_service_ready, "Text service configured");

    let narrator = TranslateTtsClient::new(config.tts_config())?;

    let mirror = MoodMirror::new(
        session,
        Arc::new(generator),
        Arc::new(narrator),
        config.narration.language.clone(),
    );

    let server_config = config.server_config();
    let state = AppState::new(mirror, server_config.clone())
        .with_text_service_ready(text_service_ready);

    serve(state, &server_config).await?;

    tracing::info!("Mood Mirror API server stopped");
    Ok(())
}

/// Initialize tracing from the logging config; `RUST_LOG` wins when set
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("moodmirror={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
