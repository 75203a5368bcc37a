//! Session store service.

use crate::identity::domain::{IdentityDomainError, PhoneNumber};
use crate::session::{
    domain::ConversationSession,
    ports::{SessionRepository, SessionRepositoryError},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for session operations.
#[derive(Debug, Error)]
pub enum SessionServiceError {
    /// The phone is missing or malformed.
    #[error(transparent)]
    Validation(#[from] IdentityDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] SessionRepositoryError),
}

/// Result type for session service operations.
pub type SessionServiceResult<T> = Result<T, SessionServiceError>;

/// Upsert-by-phone conversational state.
pub struct SessionService<R, C>
where
    R: SessionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for SessionService<R, C>
where
    R: SessionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> SessionService<R, C>
where
    R: SessionRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new session service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Activates the session for `phone`, replacing its context when one is
    /// supplied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionServiceError::Validation`] for a malformed phone.
    pub async fn activate(
        &self,
        phone: &str,
        context: Option<Value>,
    ) -> SessionServiceResult<ConversationSession> {
        let phone = PhoneNumber::new(phone)?;
        let session = self
            .repository
            .activate(&phone, context, self.clock.utc())
            .await?;
        tracing::debug!(phone = %session.phone(), "session activated");
        Ok(session)
    }

    /// Deactivates the session for `phone`. Returns `None` for an unknown
    /// phone.
    ///
    /// # Errors
    ///
    /// Returns [`SessionServiceError::Validation`] for a malformed phone.
    pub async fn deactivate(
        &self,
        phone: &str,
    ) -> SessionServiceResult<Option<ConversationSession>> {
        let phone = PhoneNumber::new(phone)?;
        let session = self.repository.deactivate(&phone, self.clock.utc()).await?;
        if session.is_some() {
            tracing::debug!(phone = %phone, "session deactivated");
        }
        Ok(session)
    }

    /// Returns the session for `phone` while it is active.
    ///
    /// # Errors
    ///
    /// Returns [`SessionServiceError::Validation`] for a malformed phone.
    pub async fn get(&self, phone: &str) -> SessionServiceResult<Option<ConversationSession>> {
        let session = self.find(phone).await?;
        Ok(session.filter(ConversationSession::is_active))
    }

    /// Returns the session for `phone` whether or not it is active.
    ///
    /// # Errors
    ///
    /// Returns [`SessionServiceError::Validation`] for a malformed phone.
    pub async fn find(&self, phone: &str) -> SessionServiceResult<Option<ConversationSession>> {
        let phone = PhoneNumber::new(phone)?;
        Ok(self.repository.find(&phone).await?)
    }
}
