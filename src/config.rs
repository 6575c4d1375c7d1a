//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig as ServerConfig;
use crate::services::{GeminiConfig, TtsConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub gemini: GeminiSection,

    #[serde(default)]
    pub narration: NarrationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Journal history configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_history_file() -> PathBuf {
    PathBuf::from("journal_history.json")
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_mb() -> usize {
    50
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ApiConfig {
    /// Base URL clients use to reach the server
    pub fn base_url(&self) -> String {
        let host = if self.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            &self.host
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Generative-text service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSection {
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Prefer the `GEMINI_API_KEY` environment variable
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_timeout")]
    pub request_timeout_secs: u64,
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            model: default_model(),
            api_key: None,
            request_timeout_secs: default_gemini_timeout(),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    #[serde(default = "default_tts_url")]
    pub base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_tts_timeout")]
    pub request_timeout_secs: u64,
}

fn default_tts_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tts_timeout() -> u64 {
    30
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            base_url: default_tts_url(),
            language: default_language(),
            request_timeout_secs: default_tts_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("moodmirror").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Default location for a user config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("moodmirror").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("MOODMIRROR_HISTORY_FILE") {
            self.journal.history_file = PathBuf::from(path);
        }

        if let Some(host) = lookup("MOODMIRROR_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("MOODMIRROR_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid MOODMIRROR_API_PORT"),
            }
        }

        if let Some(model) = lookup("MOODMIRROR_MODEL") {
            self.gemini.model = model;
        }
        if let Some(key) = lookup(crate::services::API_KEY_ENV) {
            self.gemini.api_key = Some(key);
        }

        if let Some(language) = lookup("MOODMIRROR_TTS_LANGUAGE") {
            self.narration.language = language;
        }

        if let Some(level) = lookup("MOODMIRROR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MOODMIRROR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Server settings for the API layer
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.api.host.clone(),
            port: self.api.port,
            max_body_size: self.api.max_upload_mb * 1024 * 1024,
        }
    }

    /// Settings for the generative-text client
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.gemini.base_url.clone(),
            model: self.gemini.model.clone(),
            api_key: self.gemini.api_key.clone(),
            request_timeout_secs: self.gemini.request_timeout_secs,
        }
    }

    /// Settings for the narration client
    pub fn tts_config(&self) -> TtsConfig {
        TtsConfig {
            base_url: self.narration.base_url.clone(),
            request_timeout_secs: self.narration.request_timeout_secs,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Mood Mirror Configuration
#
# Environment variables override these settings:
# - MOODMIRROR_HISTORY_FILE
# - MOODMIRROR_API_HOST
# - MOODMIRROR_API_PORT
# - MOODMIRROR_MODEL
# - MOODMIRROR_TTS_LANGUAGE
# - MOODMIRROR_LOG_LEVEL
# - MOODMIRROR_LOG_FORMAT
# - GEMINI_API_KEY

[journal]
# JSON file holding every weekly reflection
history_file = "journal_history.json"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8501

# Largest accepted upload (MB); Apple Health exports can be big
max_upload_mb = 50

[gemini]
# Generative-text API root
base_url = "https://generativelanguage.googleapis.com"

# Model used for reflections and chat
model = "gemini-2.0-flash"

# API key; prefer setting GEMINI_API_KEY instead
# api_key = ""

# Request timeout in seconds (no retries)
request_timeout_secs = 60

[narration]
# Text-to-speech service root
base_url = "https://translate.google.com"

# Language for narrated responses
language = "en"

# Request timeout in seconds
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
