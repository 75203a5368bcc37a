//! Domain model for conversational sessions.

mod session;

pub use session::{ConversationSession, PersistedSessionData};
