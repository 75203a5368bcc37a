//! Link code issuance and exact-match resolution.

use crate::identity::{
    domain::{Identity, LinkCode},
    ports::{IdentityRepository, IdentityRepositoryResult, LinkCodeGenerator},
};
use std::sync::Arc;

/// Default number of candidates drawn before giving up on issuance.
pub const DEFAULT_ISSUE_ATTEMPTS: usize = 5;

/// Issues unused link codes and resolves codes to their identity.
///
/// Resolution is an exact match on the dedicated link code field, never a
/// substring match on identifiers.
pub struct LinkCodeResolver<R>
where
    R: IdentityRepository + ?Sized,
{
    repository: Arc<R>,
    generator: Arc<dyn LinkCodeGenerator>,
    max_attempts: usize,
}

impl<R> Clone for LinkCodeResolver<R>
where
    R: IdentityRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            max_attempts: self.max_attempts,
        }
    }
}

impl<R> LinkCodeResolver<R>
where
    R: IdentityRepository + ?Sized,
{
    /// Creates a resolver drawing candidates from `generator`.
    #[must_use]
    pub fn new(repository: Arc<R>, generator: Arc<dyn LinkCodeGenerator>) -> Self {
        Self {
            repository,
            generator,
            max_attempts: DEFAULT_ISSUE_ATTEMPTS,
        }
    }

    /// Sets how many candidates are drawn before issuance fails.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the configured number of issuance attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draws a code that no identity currently holds.
    ///
    /// Returns `Ok(None)` when every attempt collided. The store's unique
    /// index remains the final arbiter between this check and the insert.
    ///
    /// # Errors
    ///
    /// Returns the repository error when a lookup fails.
    pub async fn issue(&self) -> IdentityRepositoryResult<Option<LinkCode>> {
        for attempt in 1..=self.max_attempts {
            if let Some(code) = self.draw().await? {
                return Ok(Some(code));
            }
            tracing::debug!(attempt, "link code candidate already issued");
        }
        Ok(None)
    }

    /// Draws one candidate and returns it when no identity holds it.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the lookup fails.
    pub async fn draw(&self) -> IdentityRepositoryResult<Option<LinkCode>> {
        let candidate = self.generator.generate();
        let held = self.repository.find_by_link_code(&candidate).await?;
        Ok(held.is_none().then_some(candidate))
    }

    /// Resolves `code` to the identity holding it.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the lookup fails.
    pub async fn resolve(&self, code: &LinkCode) -> IdentityRepositoryResult<Option<Identity>> {
        self.repository.find_by_link_code(code).await
    }
}
