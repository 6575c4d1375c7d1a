//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.
//!
//! The mirror sits behind a single async mutex, so at most one user
//! action runs at a time, including its service calls. Read-only handlers
//! never take that mutex; they serve the [`MirrorSnapshot`] published at
//! the end of each action, so they answer while a model call is in flight.

use crate::journal::{ConversationTurn, JournalEntry};
use crate::mirror::{MirrorStatus, MoodMirror};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;

/// Read-side copy of the mirror, refreshed after every action
#[derive(Debug, Clone)]
pub struct MirrorSnapshot {
    pub status: MirrorStatus,
    pub history: Vec<JournalEntry>,
    pub conversation: Vec<ConversationTurn>,
}

impl MirrorSnapshot {
    fn of(mirror: &MoodMirror) -> Self {
        Self {
            status: mirror.status(),
            history: mirror.history().to_vec(),
            conversation: mirror.conversation().to_vec(),
        }
    }
}

/// Shared application state for all handlers
pub struct AppState {
    /// Journaling state and service adapters
    pub mirror: Mutex<MoodMirror>,
    /// Last published state, for handlers that only read
    snapshot: RwLock<MirrorSnapshot>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Whether the text service has a credential
    pub text_service_ready: bool,
}

impl AppState {
    pub fn new(mirror: MoodMirror, config: ApiConfig) -> Self {
        Self {
            snapshot: RwLock::new(MirrorSnapshot::of(&mirror)),
            mirror: Mutex::new(mirror),
            config: Arc::new(config),
            start_time: Instant::now(),
            text_service_ready: true,
        }
    }

    /// Record whether the text service can be called at all
    pub fn with_text_service_ready(mut self, ready: bool) -> Self {
        self.text_service_ready = ready;
        self
    }

    /// Refresh the snapshot; call while still holding the mirror guard
    pub fn publish(&self, mirror: &MoodMirror) {
        let next = MirrorSnapshot::of(mirror);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Copy of the last published state
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes (export uploads)
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_body_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
