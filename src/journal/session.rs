//! Reflection Session
//!
//! Holds the conversation for the current interactive session alongside
//! the durable journal history.
//!
//! The conversation lives only in memory and is cleared by [`reset`].
//! The history mirrors the [`JournalStore`] and survives restarts.
//!
//! [`reset`]: ReflectionSession::reset

use crate::journal::error::PersistenceResult;
use crate::journal::store::JournalStore;
use crate::journal::types::{ConversationTurn, JournalEntry};

/// Conversation state plus the journal history
#[derive(Debug)]
pub struct ReflectionSession {
    turns: Vec<ConversationTurn>,
    history: Vec<JournalEntry>,
    store: JournalStore,
}

impl ReflectionSession {
    /// Start a session, loading the existing history from `store`
    pub fn open(store: JournalStore) -> PersistenceResult<Self> {
        let history = store.load()?;
        Ok(Self {
            turns: Vec::new(),
            history,
            store,
        })
    }

    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::user(text));
    }

    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::assistant(text));
    }

    /// Clear the conversation. The journal history is untouched.
    pub fn reset(&mut self) {
        tracing::debug!(turns = self.turns.len(), "Conversation reset");
        self.turns.clear();
    }

    /// Conversation so far, in order
    pub fn current_turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Option<&ConversationTurn> {
        self.turns.get(index)
    }

    /// Append an entry and rewrite the durable history.
    ///
    /// If the rewrite fails the in-memory history is rolled back so it keeps
    /// matching what is on disk.
    pub fn record_journal_entry(&mut self, entry: JournalEntry) -> PersistenceResult<()> {
        self.history.push(entry);

        if let Err(e) = self.store.write_all(&self.history) {
            self.history.pop();
            tracing::error!(error = %e, "Failed to persist journal entry");
            return Err(e);
        }

        tracing::info!(entries = self.history.len(), "Journal entry recorded");
        Ok(())
    }

    /// Re-read the history from the store, replacing the in-memory copy
    pub fn load_history(&mut self) -> PersistenceResult<&[JournalEntry]> {
        self.history = self.store.load()?;
        Ok(&self.history)
    }

    /// History as currently held in memory
    pub fn history(&self) -> &[JournalEntry] {
        &self.history
    }
}
