//! Prompt Composer
//!
//! Builds the two prompts sent to the text-generation service:
//!
//! - the weekly reflection prompt (mood + journal + health summary)
//! - the chat prompt (the whole conversation replayed as role-labelled lines)
//!
//! Both honor the style modifier. Long conversations are sent in full;
//! there is no truncation.

use crate::health::{HealthSummary, WeeklyWindow};
use crate::journal::{ConversationTurn, Mood};

/// Appended to the reflection prompt when the style modifier is on
pub const STYLE_INSTRUCTION: &str =
    " Please respond in a Gen-Z style using casual, trendy language with modern slang.";

/// Prefixed to the chat prompt when the style modifier is on
pub const STYLE_PERSONA: &str = "You are a Gen-Z style supportive therapist. Use casual, trendy language with modern slang in all your responses. ";

/// Marks a reflection when it is shown in the conversation
pub const REFLECTION_PREFIX: &str = "🧠 Your Weekly Reflection: ";

/// Open assistant turn the model is asked to complete
const ASSISTANT_MARKER: &str = "\nassistant:";

/// Inputs for a weekly reflection
#[derive(Debug, Clone)]
pub struct ReflectionPrompt<'a> {
    pub window: WeeklyWindow,
    pub mood: Mood,
    pub journal: &'a str,
    pub summary: &'a HealthSummary,
    pub style_modifier: bool,
}

/// Compose the weekly reflection prompt
pub fn compose_reflection_prompt(input: &ReflectionPrompt<'_>) -> String {
    let style = if input.style_modifier {
        STYLE_INSTRUCTION
    } else {
        ""
    };

    format!(
        "I'm a user journaling my emotions and mood for the week {start} to {end}.\n\
         \n\
         Mood: {mood}\n\
         Journal entry: {journal}\n\
         \n\
         Health data summary:\n\
         {summary}\n\
         \n\
         Please act as a supportive AI therapist and provide a very brief summary of my week \
         in 1-2 concise sentences that includes insights drawn from both my mood journal and \
         my health data. Invite further conversation.{style}",
        start = input.window.start,
        end = input.window.end,
        mood = input.mood.code(),
        journal = input.journal,
        summary = input.summary.render(),
        style = style,
    )
}

/// Compose the chat prompt from the full conversation
pub fn compose_chat_prompt(turns: &[ConversationTurn], style_modifier: bool) -> String {
    let conversation = turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::with_capacity(conversation.len() + STYLE_PERSONA.len() + 16);
    if style_modifier {
        prompt.push_str(STYLE_PERSONA);
    }
    prompt.push_str(&conversation);
    prompt.push_str(ASSISTANT_MARKER);
    prompt
}

/// Text shown in the conversation for a generated reflection
pub fn reflection_message(reflection: &str) -> String {
    format!("{}{}", REFLECTION_PREFIX, reflection)
}

/// Text to narrate for an assistant message, without the reflection prefix
pub fn narration_text(message: &str) -> &str {
    message
        .strip_prefix(REFLECTION_PREFIX.trim_end())
        .map(str::trim)
        .unwrap_or(message)
}
