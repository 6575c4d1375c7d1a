//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::health::{type_counts, HealthRecord, HealthSummary, WeeklyWindow};
use crate::journal::{ConversationTurn, JournalEntry, Mood};

// ============================================
// MOOD DTOs
// ============================================

/// One entry of the mood picker
#[derive(Debug, Serialize)]
pub struct MoodDto {
    /// Stable code sent back in reflect requests
    pub code: String,
    /// Label shown to the user
    pub label: String,
}

impl From<Mood> for MoodDto {
    fn from(mood: Mood) -> Self {
        Self {
            code: mood.code().to_string(),
            label: mood.label().to_string(),
        }
    }
}

// ============================================
// HEALTH DATA DTOs
// ============================================

/// Upload of a health CSV table
#[derive(Debug, Deserialize)]
pub struct HealthDataUpload {
    /// CSV text with at least `type`, `value` and `startDate` columns
    pub csv: String,
}

/// Apple Health export upload
#[derive(Debug, Deserialize)]
pub struct AppleHealthImportRequest {
    /// Base64-encoded export file
    pub data: String,
    /// "zip" or "xml"
    #[serde(default = "default_import_format")]
    pub format: String,
}

fn default_import_format() -> String {
    "zip".to_string()
}

/// Result of loading a health table
#[derive(Debug, Serialize)]
pub struct HealthDataResponse {
    /// Records now loaded
    pub records: usize,
    /// Records per type identifier
    pub by_type: BTreeMap<String, usize>,
}

impl HealthDataResponse {
    pub fn from_records(records: &[HealthRecord]) -> Self {
        Self {
            records: records.len(),
            by_type: type_counts(records)
                .into_iter()
                .map(|(t, n)| (t.identifier().to_string(), n))
                .collect(),
        }
    }
}

/// Query string for the weekly summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub week_start: NaiveDate,
}

/// Weekly health summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub window: WeeklyWindow,
    pub summary: HealthSummary,
    /// Summary as quoted in the reflection prompt
    pub rendered: String,
}

// ============================================
// SETTINGS DTOs
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsDto {
    /// Casual Gen-Z tone for generated text
    pub style_modifier: bool,
}

// ============================================
// CHAT DTOs
// ============================================

/// Chat message from the user
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply plus the conversation so far
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub turns: Vec<ConversationTurn>,
}

/// Current conversation
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub turns: Vec<ConversationTurn>,
}

// ============================================
// HISTORY DTOs
// ============================================

/// Durable journal history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<JournalEntry>,
}

// ============================================
// HEALTH CHECK DTOs
// ============================================

/// Full service health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// "ok" or "missing_credential"
    pub text_service: String,
    pub journal_entries: usize,
    /// Loaded health records, if a table is loaded
    pub health_records: Option<usize>,
    pub uptime_seconds: u64,
    pub version: String,
}
