//! Conversation session record.

use crate::identity::domain::PhoneNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversational state keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    phone: PhoneNumber,
    active: bool,
    context: Value,
    last_interaction_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Session key.
    pub phone: PhoneNumber,
    /// Whether a conversation is in progress.
    pub active: bool,
    /// Opaque context payload.
    pub context: Value,
    /// Time of the latest activation or deactivation.
    pub last_interaction_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Creates an active session with an empty object as context when none
    /// is supplied.
    #[must_use]
    pub fn activated(phone: PhoneNumber, context: Option<Value>, at: DateTime<Utc>) -> Self {
        Self {
            phone,
            active: true,
            context: context.unwrap_or_else(empty_context),
            last_interaction_at: at,
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            phone: data.phone,
            active: data.active,
            context: data.context,
            last_interaction_at: data.last_interaction_at,
        }
    }

    /// Re-activates the session; a supplied context replaces the stored one.
    pub fn reactivate(&mut self, context: Option<Value>, at: DateTime<Utc>) {
        self.active = true;
        if let Some(replacement) = context {
            self.context = replacement;
        }
        self.last_interaction_at = at;
    }

    /// Marks the session inactive, keeping its context.
    pub const fn deactivate(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.last_interaction_at = at;
    }

    /// Returns the session key.
    #[must_use]
    pub const fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Returns whether a conversation is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the context payload.
    #[must_use]
    pub const fn context(&self) -> &Value {
        &self.context
    }

    /// Returns the time of the latest activation or deactivation.
    #[must_use]
    pub const fn last_interaction_at(&self) -> DateTime<Utc> {
        self.last_interaction_at
    }
}

fn empty_context() -> Value {
    Value::Object(serde_json::Map::new())
}
