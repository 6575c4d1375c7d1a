//! Journal data types
//!
//! - `Mood`: the fixed five-entry mood vocabulary
//! - `ConversationTurn`: one line of the chat with the assistant
//! - `JournalEntry`: one persisted weekly reflection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Overall mood for a week.
///
/// Serialized by its code. Display labels are also accepted on read, which
/// is how older history files stored the mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "happy", alias = "😄 Happy")]
    Happy,
    #[serde(rename = "neutral", alias = "😐 Neutral")]
    Neutral,
    #[serde(rename = "sad", alias = "😢 Sad")]
    Sad,
    #[serde(rename = "anxious", alias = "😰 Anxious")]
    Anxious,
    #[serde(rename = "angry", alias = "😠 Angry")]
    Angry,
}

impl Mood {
    /// All moods in picker order
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Anxious,
        Mood::Angry,
    ];

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "😄 Happy",
            Mood::Neutral => "😐 Neutral",
            Mood::Sad => "😢 Sad",
            Mood::Anxious => "😰 Anxious",
            Mood::Angry => "😠 Angry",
        }
    }

    /// Internal code
    pub fn code(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Angry => "angry",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.code().eq_ignore_ascii_case(needle) || m.label() == needle)
            .ok_or_else(|| {
                format!(
                    "unknown mood '{}', expected one of: happy, neutral, sad, anxious, angry",
                    s
                )
            })
    }
}

/// Who spoke a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A persisted weekly reflection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub mood: Mood,
    pub journal: String,
    /// Model output, without any display prefix
    pub reflection: String,
    #[serde(rename = "gen_z_mode", default)]
    pub style_modifier: bool,
}
