//! Repository port for conversation sessions.

use crate::identity::domain::PhoneNumber;
use crate::session::domain::ConversationSession;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session repository operations.
pub type SessionRepositoryResult<T> = Result<T, SessionRepositoryError>;

/// Session persistence contract.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - Exactly one row exists per phone
/// - [`SessionRepository::activate`] is a single atomic upsert
/// - Rows are never deleted
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts or re-activates the session for `phone`.
    ///
    /// A supplied `context` replaces the stored one; `None` keeps it, or
    /// starts from an empty object for a new row.
    async fn activate(
        &self,
        phone: &PhoneNumber,
        context: Option<Value>,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<ConversationSession>;

    /// Marks the session for `phone` inactive.
    ///
    /// Returns `None` without creating a row when `phone` has no session.
    async fn deactivate(
        &self,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<Option<ConversationSession>>;

    /// Finds the session for `phone`, active or not.
    async fn find(&self, phone: &PhoneNumber)
    -> SessionRepositoryResult<Option<ConversationSession>>;
}

/// Errors returned by session repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
