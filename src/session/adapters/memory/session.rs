//! In-memory session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use crate::identity::domain::PhoneNumber;
use crate::session::{
    domain::ConversationSession,
    ports::{SessionRepository, SessionRepositoryError, SessionRepositoryResult},
};

/// Thread-safe in-memory session repository.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<PhoneNumber, ConversationSession>>>,
}

impl InMemorySessionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> SessionRepositoryError {
    SessionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn activate(
        &self,
        phone: &PhoneNumber,
        context: Option<Value>,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<ConversationSession> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = match sessions.entry(phone.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().reactivate(context, at);
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(ConversationSession::activated(phone.clone(), context, at))
                .clone(),
        };
        Ok(session)
    }

    async fn deactivate(
        &self,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<Option<ConversationSession>> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        Ok(sessions.get_mut(phone).map(|session| {
            session.deactivate(at);
            session.clone()
        }))
    }

    async fn find(
        &self,
        phone: &PhoneNumber,
    ) -> SessionRepositoryResult<Option<ConversationSession>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(phone).cloned())
    }
}
