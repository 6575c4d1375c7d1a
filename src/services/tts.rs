//! Translate TTS Client
//!
//! Narrates text through the public `translate_tts` endpoint, which returns
//! MP3 audio for short snippets. Longer text is split at word boundaries
//! and the MP3 chunks are concatenated in order.

use super::{ensure_success, Narrator, ServiceError, ServiceResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Longest snippet the endpoint accepts, in characters
pub const MAX_CHUNK_CHARS: usize = 200;

/// Configuration for the TTS client
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Service root (e.g., "https://translate.google.com")
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.google.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Narrator backed by the translate TTS endpoint
pub struct TranslateTtsClient {
    client: Client,
    config: TtsConfig,
}

impl TranslateTtsClient {
    pub fn new(config: TtsConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn chunk_url(&self, chunk: &str, language: &str, idx: usize, total: usize) -> String {
        format!(
            "{}/translate_tts?ie=UTF-8&client=tw-ob&tl={}&q={}&total={}&idx={}&textlen={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(language),
            urlencoding::encode(chunk),
            total,
            idx,
            chunk.chars().count()
        )
    }
}

#[async_trait]
impl Narrator for TranslateTtsClient {
    async fn synthesize(&self, text: &str, language: &str) -> ServiceResult<Vec<u8>> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        let total = chunks.len();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .get(self.chunk_url(chunk, language, idx, total))
                .send()
                .await?;
            let response = ensure_success(response).await?;
            audio.extend_from_slice(&response.bytes().await?);
        }

        if audio.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        tracing::debug!(chunks = total, bytes = audio.len(), language, "Synthesized narration");
        Ok(audio)
    }
}

/// Split text into snippets of at most `max_chars` characters.
///
/// Breaks at whitespace; a single word longer than the limit is cut.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };

        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}
