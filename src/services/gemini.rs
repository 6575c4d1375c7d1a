//! Gemini REST Client
//!
//! Calls `models/{model}:generateContent` with a single text part and
//! returns the first candidate's text.

use super::{ensure_success, ServiceError, ServiceResult, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root (e.g., "https://generativelanguage.googleapis.com")
    pub base_url: String,
    /// Model name, with or without the `models/` prefix
    pub model: String,
    /// Explicit key; falls back to `GEMINI_API_KEY`
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

/// Text generator backed by the Gemini API
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client. A missing key is reported on first use, not here.
    pub fn new(config: GeminiConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            });

        if api_key.is_none() {
            tracing::warn!("{} not set; reflections will fail until it is", API_KEY_ENV);
        }

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        let model = self
            .config
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.config.model);
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ServiceResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential(API_KEY_ENV))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let result: GenerateContentResponse = response.json().await?;
        let text = result.text().ok_or(ServiceError::EmptyResponse)?;

        tracing::debug!(response_chars = text.len(), "Gemini responded");
        Ok(text)
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Trimmed text of the first candidate, if any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            base_url: server.uri(),
            model: "gemini-2.0-flash".to_string(),
            api_key: api_key.map(String::from),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn test_endpoint_strips_models_prefix() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "http://localhost:9999/".to_string(),
            model: "models/gemini-1.5-flash".to_string(),
            api_key: Some("k".to_string()),
            request_timeout_secs: 5,
        })
        .unwrap();

        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "How was my week?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"text": "  A calm week, "},
                    {"text": "want to talk more?\n"}
                ]}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let text = client.generate("How was my week?").await.unwrap();

        assert_eq!(text, "A calm week, want to talk more?");
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad-key"));
        let err = client.generate("hi").await.unwrap_err();

        assert!(matches!(err, ServiceError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        assert!(matches!(
            client.generate("hi").await,
            Err(ServiceError::EmptyResponse)
        ));
    }
}
