//! Journal
//!
//! Mood vocabulary, the conversation with the assistant, and the durable
//! history of weekly reflections.
//!
//! - **types**: `Mood`, `Role`, `ConversationTurn`, `JournalEntry`
//! - **store**: single-writer JSON history file
//! - **session**: `ReflectionSession`, the in-memory view used by the app
//! - **error**: error types

pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use error::{PersistenceError, PersistenceResult};
pub use session::ReflectionSession;
pub use store::JournalStore;
pub use types::{ConversationTurn, JournalEntry, Mood, Role};
