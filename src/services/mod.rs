//! External Service Adapters
//!
//! Thin clients for the two hosted services the mirror depends on:
//!
//! - **TextGenerator**: turns a prompt into reflective text (Gemini)
//! - **Narrator**: turns a response into speech (translate TTS)
//!
//! Both are opaque collaborators. Calls are made one at a time and are
//! never retried; a failure goes straight back to the caller.

mod gemini;
mod tts;

pub use gemini::{GeminiClient, GeminiConfig, API_KEY_ENV};
pub use tts::{split_for_speech, TranslateTtsClient, TtsConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Generative-text service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a response for `prompt`
    async fn generate(&self, prompt: &str) -> ServiceResult<String>;
}

/// Text-to-speech service
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Synthesize `text` spoken in `language`, returning MP3 bytes
    async fn synthesize(&self, text: &str, language: &str) -> ServiceResult<Vec<u8>>;
}

/// Errors from the hosted services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Service unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Service returned no content")]
    EmptyResponse,
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_connect() {
            ServiceError::Unavailable
        } else {
            ServiceError::Request(e)
        }
    }
}

/// Result type alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Turn a non-success response into [`ServiceError::Api`]
async fn ensure_success(response: reqwest::Response) -> ServiceResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    Err(ServiceError::Api {
        status: status.as_u16(),
        message,
    })
}
