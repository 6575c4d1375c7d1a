//! # Mood Mirror
//!
//! A reflective journaling service that pairs a user's weekly mood and
//! journal text with their Apple Health data, asks a generative model for
//! a short supportive reflection, and keeps a durable history of every
//! reflection.
//!
//! ## Features
//!
//! - **Health extraction**: streaming Apple Health `export.xml` parsing, ZIP or plain
//! - **Weekly summaries**: values grouped by type for a 7-day window
//! - **Reflections and chat**: prompt composition with an optional casual tone
//! - **Durable history**: single-writer JSON journal with atomic rewrites
//! - **Narration**: assistant responses as MP3 audio
//!
//! ## Modules
//!
//! - [`health`]: extractor, CSV table, weekly summaries
//! - [`journal`]: moods, conversation, durable history
//! - [`prompt`]: prompt composition
//! - [`services`]: generative-text and TTS adapters
//! - [`mirror`]: the user actions over shared state
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodmirror::health::{extract_path, summarize, WeeklyWindow};
//! use chrono::NaiveDate;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = extract_path(Path::new("export.zip"))?;
//!
//!     let week = WeeklyWindow::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//!     let summary = summarize(&records, week);
//!
//!     println!("{}", summary.render());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod health;
pub mod journal;
pub mod mirror;
pub mod prompt;
pub mod services;

// Re-export top-level types for convenience
pub use health::{
    HealthError, HealthRecord, HealthResult, HealthSummary, RecordType, WeeklyWindow,
};

pub use journal::{
    ConversationTurn, JournalEntry, JournalStore, Mood, PersistenceError, ReflectionSession, Role,
};

pub use services::{
    GeminiClient, GeminiConfig, Narrator, ServiceError, TextGenerator, TranslateTtsClient,
    TtsConfig,
};

pub use mirror::{MirrorError, MirrorResult, MoodMirror, ReflectRequest, Reflection};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};
