//! Mood Mirror
//!
//! The application as a set of named user actions over explicit state:
//!
//! | Action              | Effect                                              |
//! |---------------------|-----------------------------------------------------|
//! | `load_health_csv`   | replace the uploaded health table                   |
//! | `set_style_modifier`| toggle the tone used in prompts                     |
//! | `reflect`           | summarize week → prompt → generate → record entry   |
//! | `send_message`      | append user turn → prompt → generate → append reply |
//! | `new_chat`          | clear the conversation                              |
//! | `narrate`           | speak one assistant turn                            |
//!
//! Missing input is reported as [`MirrorError::InputMissing`] and leaves the
//! state unchanged. Every other failure propagates as-is.

use crate::health::{
    read_csv_str, summarize, HealthError, HealthRecord, HealthSummary, WeeklyWindow,
};
use crate::journal::{
    ConversationTurn, JournalEntry, Mood, PersistenceError, ReflectionSession, Role,
};
use crate::prompt::{
    compose_chat_prompt, compose_reflection_prompt, narration_text, reflection_message,
    ReflectionPrompt,
};
use crate::services::{Narrator, ServiceError, TextGenerator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by mirror actions
#[derive(Error, Debug)]
pub enum MirrorError {
    /// A required file, selection or text was not provided
    #[error("{0}")]
    InputMissing(String),

    /// A conversation position that does not exist
    #[error("{0}")]
    NotFound(String),

    /// Health data could not be parsed
    #[error("Parse failure: {0}")]
    Parse(#[from] HealthError),

    /// Text or speech service failed
    #[error("External service failure: {0}")]
    Service(#[from] ServiceError),

    /// Journal history could not be read or written
    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for mirror actions
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Input for a weekly reflection
#[derive(Debug, Clone, Deserialize)]
pub struct ReflectRequest {
    pub week_start: NaiveDate,
    pub mood: Mood,
    pub journal: String,
}

/// Outcome of a weekly reflection
#[derive(Debug, Clone, Serialize)]
pub struct Reflection {
    pub window: WeeklyWindow,
    pub summary: HealthSummary,
    /// Model output
    pub reflection: String,
    /// As appended to the conversation
    pub message: String,
    pub entry: JournalEntry,
}

/// Snapshot of the mirror's state
#[derive(Debug, Clone, Serialize)]
pub struct MirrorStatus {
    pub health_records: Option<usize>,
    pub style_modifier: bool,
    pub turns: usize,
    pub journal_entries: usize,
}

/// Interactive journaling state and the services it talks to
pub struct MoodMirror {
    session: ReflectionSession,
    health: Option<Vec<HealthRecord>>,
    style_modifier: bool,
    language: String,
    generator: Arc<dyn TextGenerator>,
    narrator: Arc<dyn Narrator>,
}

impl MoodMirror {
    pub fn new(
        session: ReflectionSession,
        generator: Arc<dyn TextGenerator>,
        narrator: Arc<dyn Narrator>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            session,
            health: None,
            style_modifier: false,
            language: language.into(),
            generator,
            narrator,
        }
    }

    // ============================================
    // Health data
    // ============================================

    /// Replace the health table with an uploaded CSV
    pub fn load_health_csv(&mut self, csv_data: &str) -> MirrorResult<usize> {
        let records = read_csv_str(csv_data)?;
        Ok(self.load_health_records(records))
    }

    /// Replace the health table with already-parsed records
    pub fn load_health_records(&mut self, records: Vec<HealthRecord>) -> usize {
        let count = records.len();
        self.health = Some(records);
        tracing::info!(records = count, "Health data loaded");
        count
    }

    pub fn clear_health_data(&mut self) {
        self.health = None;
    }

    /// Health summary for the week starting at `week_start`
    pub fn weekly_summary(&self, week_start: NaiveDate) -> MirrorResult<HealthSummary> {
        let records = self.health_records()?;
        Ok(summarize(records, WeeklyWindow::starting(week_start)))
    }

    fn health_records(&self) -> MirrorResult<&[HealthRecord]> {
        match self.health.as_deref() {
            Some(records) if !records.is_empty() => Ok(records),
            _ => Err(MirrorError::InputMissing(
                "Please upload your health data CSV first.".to_string(),
            )),
        }
    }

    // ============================================
    // Settings
    // ============================================

    pub fn set_style_modifier(&mut self, enabled: bool) {
        self.style_modifier = enabled;
    }

    pub fn style_modifier(&self) -> bool {
        self.style_modifier
    }

    pub fn status(&self) -> MirrorStatus {
        MirrorStatus {
            health_records: self.health.as_ref().map(Vec::len),
            style_modifier: self.style_modifier,
            turns: self.session.current_turns().len(),
            journal_entries: self.session.history().len(),
        }
    }

    // ============================================
    // Reflection and chat
    // ============================================

    /// Generate and record a weekly reflection
    pub async fn reflect(&mut self, request: ReflectRequest) -> MirrorResult<Reflection> {
        let journal = request.journal.trim();
        if journal.is_empty() {
            return Err(MirrorError::InputMissing(
                "Write about your week before reflecting.".to_string(),
            ));
        }

        let window = WeeklyWindow::starting(request.week_start);
        let summary = summarize(self.health_records()?, window);

        let prompt = compose_reflection_prompt(&ReflectionPrompt {
            window,
            mood: request.mood,
            journal,
            summary: &summary,
            style_modifier: self.style_modifier,
        });

        tracing::info!(
            window = %window,
            mood = %request.mood,
            health_values = summary.value_count(),
            "Generating weekly reflection"
        );
        let reflection = self.generator.generate(&prompt).await?;

        let entry = JournalEntry {
            week_start: window.start,
            week_end: window.end,
            mood: request.mood,
            journal: journal.to_string(),
            reflection: reflection.clone(),
            style_modifier: self.style_modifier,
        };
        self.session.record_journal_entry(entry.clone())?;

        // Only a persisted reflection reaches the conversation
        let message = reflection_message(&reflection);
        self.session.append_assistant_turn(message.clone());

        Ok(Reflection {
            window,
            summary,
            reflection,
            message,
            entry,
        })
    }

    /// Send a chat message and return the assistant's reply
    pub async fn send_message(&mut self, text: &str) -> MirrorResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MirrorError::InputMissing(
                "Enter a message before sending.".to_string(),
            ));
        }

        self.session.append_user_turn(text);
        let prompt = compose_chat_prompt(self.session.current_turns(), self.style_modifier);

        tracing::debug!(turns = self.session.current_turns().len(), "Generating chat reply");
        let reply = self.generator.generate(&prompt).await?;

        self.session.append_assistant_turn(reply.clone());
        Ok(reply)
    }

    /// Start a new conversation
    pub fn new_chat(&mut self) {
        self.session.reset();
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        self.session.current_turns()
    }

    pub fn history(&self) -> &[JournalEntry] {
        self.session.history()
    }

    // ============================================
    // Narration
    // ============================================

    /// Speak the assistant turn at `index`
    pub async fn narrate(&self, index: usize) -> MirrorResult<Vec<u8>> {
        let turn = self.session.turn(index).ok_or_else(|| {
            MirrorError::NotFound(format!("No message at position {}.", index))
        })?;

        if turn.role != Role::Assistant {
            return Err(MirrorError::InputMissing(
                "Only assistant responses can be narrated.".to_string(),
            ));
        }

        let text = narration_text(&turn.text);
        let audio = self.narrator.synthesize(text, &self.language).await?;
        Ok(audio)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::journal::JournalStore;
    use crate::prompt::{REFLECTION_PREFIX, STYLE_INSTRUCTION, STYLE_PERSONA};
    use crate::services::ServiceResult;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Generator that echoes a fixed reply and remembers prompts
    pub(crate) struct StubGenerator {
        pub reply: String,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub(crate) fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> ServiceResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> ServiceResult<String> {
            Err(ServiceError::Unavailable)
        }
    }

    /// Narrator that returns the text it was given as bytes
    pub(crate) struct EchoNarrator;

    #[async_trait]
    impl Narrator for EchoNarrator {
        async fn synthesize(&self, text: &str, language: &str) -> ServiceResult<Vec<u8>> {
            Ok(format!("{}:{}", language, text).into_bytes())
        }
    }

    pub(crate) const HEALTH_CSV: &str = "type,value,unit,startDate,endDate,source
HKQuantityTypeIdentifierStepCount,100,count,2023-12-31 09:00:00 -0500,,iPhone
HKQuantityTypeIdentifierStepCount,200,count,2024-01-01 09:00:00 -0500,,iPhone
HKQuantityTypeIdentifierRestingHeartRate,58,count/min,2024-01-06 07:00:00 -0500,,Watch
HKQuantityTypeIdentifierStepCount,300,count,2024-01-08 09:00:00 -0500,,iPhone";

    fn mirror_with(path: &Path, generator: Arc<dyn TextGenerator>) -> MoodMirror {
        let session = ReflectionSession::open(JournalStore::open(path).unwrap()).unwrap();
        MoodMirror::new(session, generator, Arc::new(EchoNarrator), "en")
    }

    fn request(journal: &str) -> ReflectRequest {
        ReflectRequest {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            mood: Mood::Anxious,
            journal: journal.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reflect_requires_health_data() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(StubGenerator::new("unused"));
        let mut mirror = mirror_with(&dir.path().join("h.json"), generator.clone());

        let err = mirror.reflect(request("A long week")).await.unwrap_err();

        assert!(matches!(err, MirrorError::InputMissing(_)));
        assert!(generator.prompts.lock().unwrap().is_empty());
        assert!(mirror.conversation().is_empty());
        assert!(mirror.history().is_empty());
    }

    #[tokio::test]
    async fn test_reflect_requires_journal_text() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("unused")),
        );
        mirror.load_health_csv(HEALTH_CSV).unwrap();

        let err = mirror.reflect(request("   ")).await.unwrap_err();
        assert!(matches!(err, MirrorError::InputMissing(_)));
        assert_eq!(mirror.status().turns, 0);
    }

    #[tokio::test]
    async fn test_reflect_records_entry_and_turn() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(StubGenerator::new("Busy but you kept moving."));
        let mut mirror = mirror_with(&dir.path().join("h.json"), generator.clone());
        mirror.load_health_csv(HEALTH_CSV).unwrap();

        let reflection = mirror.reflect(request("Deadlines everywhere")).await.unwrap();

        assert_eq!(reflection.reflection, "Busy but you kept moving.");
        assert_eq!(reflection.summary.value_count(), 2);
        assert_eq!(
            reflection.message,
            format!("{}Busy but you kept moving.", REFLECTION_PREFIX)
        );

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"HKQuantityTypeIdentifierStepCount\": [\n    200\n  ]"));
        assert!(prompts[0].contains("\"HKQuantityTypeIdentifierRestingHeartRate\""));
        assert!(!prompts[0].contains("300"));
        assert!(!prompts[0].contains(STYLE_INSTRUCTION));

        assert_eq!(mirror.conversation().len(), 1);
        assert_eq!(mirror.conversation()[0].role, Role::Assistant);
        assert_eq!(mirror.history().len(), 1);
        assert_eq!(mirror.history()[0].reflection, "Busy but you kept moving.");
        assert_eq!(mirror.history()[0].week_end.to_string(), "2024-01-07");
    }

    #[tokio::test]
    async fn test_reflect_with_empty_week_uses_sentinel() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(StubGenerator::new("ok"));
        let mut mirror = mirror_with(&dir.path().join("h.json"), generator.clone());
        mirror.load_health_csv(HEALTH_CSV).unwrap();

        let mut req = request("Quiet");
        req.week_start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let reflection = mirror.reflect(req).await.unwrap();

        assert_eq!(reflection.summary, HealthSummary::NoData);
        assert!(generator.prompts.lock().unwrap()[0]
            .contains("No health data available for this week."));
    }

    #[tokio::test]
    async fn test_style_modifier_reaches_prompts() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(StubGenerator::new("no cap, solid week"));
        let mut mirror = mirror_with(&dir.path().join("h.json"), generator.clone());
        mirror.load_health_csv(HEALTH_CSV).unwrap();
        mirror.set_style_modifier(true);

        mirror.reflect(request("Gym every day")).await.unwrap();
        mirror.send_message("thanks").await.unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].ends_with(STYLE_INSTRUCTION));
        assert!(prompts[1].starts_with(STYLE_PERSONA));
        assert!(mirror.history()[0].style_modifier);
    }

    #[tokio::test]
    async fn test_chat_replays_conversation() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(StubGenerator::new("Tell me more."));
        let mut mirror = mirror_with(&dir.path().join("h.json"), generator.clone());

        let reply = mirror.send_message("I felt tired").await.unwrap();
        assert_eq!(reply, "Tell me more.");
        mirror.send_message("Mostly at work").await.unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts[0], "user: I felt tired\nassistant:");
        assert_eq!(
            prompts[1],
            "user: I felt tired\nassistant: Tell me more.\nuser: Mostly at work\nassistant:"
        );
        assert_eq!(mirror.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("x")),
        );

        assert!(matches!(
            mirror.send_message("  ").await,
            Err(MirrorError::InputMissing(_))
        ));
        assert!(mirror.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(&dir.path().join("h.json"), Arc::new(FailingGenerator));
        mirror.load_health_csv(HEALTH_CSV).unwrap();

        let err = mirror.reflect(request("week")).await.unwrap_err();
        assert!(matches!(err, MirrorError::Service(ServiceError::Unavailable)));
        assert!(mirror.history().is_empty());
    }

    #[tokio::test]
    async fn test_new_chat_keeps_history() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("ok")),
        );
        mirror.load_health_csv(HEALTH_CSV).unwrap();
        mirror.reflect(request("week")).await.unwrap();
        mirror.send_message("hi").await.unwrap();

        mirror.new_chat();

        assert!(mirror.conversation().is_empty());
        assert_eq!(mirror.history().len(), 1);
    }

    #[tokio::test]
    async fn test_narrate_strips_prefix_and_checks_role() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("Rest well.")),
        );
        mirror.load_health_csv(HEALTH_CSV).unwrap();
        mirror.reflect(request("week")).await.unwrap();
        mirror.send_message("thanks").await.unwrap();

        let audio = mirror.narrate(0).await.unwrap();
        assert_eq!(audio, b"en:Rest well.".to_vec());

        assert!(matches!(
            mirror.narrate(1).await,
            Err(MirrorError::InputMissing(_))
        ));
        assert!(matches!(
            mirror.narrate(9).await,
            Err(MirrorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_conversation_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h.json");
        let mut mirror = mirror_with(&path, Arc::new(StubGenerator::new("Rest well.")));
        mirror.load_health_csv(HEALTH_CSV).unwrap();

        // A directory where the temporary file goes makes the rewrite fail
        std::fs::create_dir(dir.path().join("h.json.tmp")).unwrap();

        let err = mirror.reflect(request("week")).await.unwrap_err();

        assert!(matches!(err, MirrorError::Persistence(_)));
        assert!(mirror.conversation().is_empty());
        assert!(mirror.history().is_empty());
    }

    #[test]
    fn test_summary_without_health_data_names_the_upload() {
        let dir = tempdir().unwrap();
        let mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("x")),
        );

        let err = mirror
            .weekly_summary(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap_err();

        match err {
            MirrorError::InputMissing(message) => {
                assert_eq!(message, "Please upload your health data CSV first.");
                assert!(!message.contains("reflect"));
            }
            other => panic!("expected InputMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_upload_is_parse_failure() {
        let dir = tempdir().unwrap();
        let mut mirror = mirror_with(
            &dir.path().join("h.json"),
            Arc::new(StubGenerator::new("x")),
        );

        let err = mirror.load_health_csv("value,unit\n1,count").unwrap_err();
        assert!(matches!(err, MirrorError::Parse(_)));
        assert_eq!(mirror.status().health_records, None);
    }
}
