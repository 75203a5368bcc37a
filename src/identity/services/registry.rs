//! Service layer for identity creation, lookup, promotion and removal.

use super::LinkCodeResolver;
use crate::identity::{
    domain::{Identity, IdentityDomainError, IdentityId, LinkCode, OriginChannel, PhoneNumber},
    ports::{IdentityRepository, IdentityRepositoryError, LinkCodeGenerator},
};
use crate::task::ports::{OwnershipMigrator, TaskRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for identity registry operations.
#[derive(Debug, Error)]
pub enum IdentityRegistryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),
    /// Identity repository operation failed.
    #[error(transparent)]
    Repository(#[from] IdentityRepositoryError),
    /// Task ownership lookup failed.
    #[error(transparent)]
    Ownership(#[from] TaskRepositoryError),
    /// The identity still owns tasks; migrate them before deleting it.
    #[error("identity {id} still owns {count} task(s)")]
    StillOwnsTasks {
        /// Identity that was about to be deleted.
        id: IdentityId,
        /// Number of tasks it still owns.
        count: u64,
    },
    /// No unused link code could be issued.
    #[error("no unused link code after {attempts} attempt(s)")]
    LinkCodeSpaceExhausted {
        /// Number of candidates drawn.
        attempts: usize,
    },
}

/// Result type for identity registry service operations.
pub type IdentityRegistryResult<T> = Result<T, IdentityRegistryError>;

/// Durable registry of guest and linked identities.
pub struct IdentityRegistryService<R, O, C>
where
    R: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    ownership: Arc<O>,
    resolver: LinkCodeResolver<R>,
    clock: Arc<C>,
}

impl<R, O, C> Clone for IdentityRegistryService<R, O, C>
where
    R: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            ownership: Arc::clone(&self.ownership),
            resolver: self.resolver.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, O, C> IdentityRegistryService<R, O, C>
where
    R: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a registry issuing codes drawn from `generator`.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        ownership: Arc<O>,
        generator: Arc<dyn LinkCodeGenerator>,
        clock: Arc<C>,
    ) -> Self {
        let resolver = LinkCodeResolver::new(Arc::clone(&repository), generator);
        Self {
            repository,
            ownership,
            resolver,
            clock,
        }
    }

    /// Sets how many link code candidates are drawn per guest creation.
    #[must_use]
    pub fn with_max_code_attempts(mut self, max_attempts: usize) -> Self {
        self.resolver = self.resolver.with_max_attempts(max_attempts);
        self
    }

    /// Returns the link code resolver.
    #[must_use]
    pub const fn resolver(&self) -> &LinkCodeResolver<R> {
        &self.resolver
    }

    /// Creates a phone-less guest identity with a fresh link code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError::LinkCodeSpaceExhausted`] when every
    /// code candidate collided, or the repository error on storage failure.
    pub async fn create_guest(&self, origin: OriginChannel) -> IdentityRegistryResult<Identity> {
        let identity = self
            .store_with_fresh_code(|code, clock| Identity::new_guest(origin, code, clock))
            .await?;
        tracing::info!(
            identity_id = %identity.id(),
            origin = origin.as_str(),
            "guest identity created"
        );
        Ok(identity)
    }

    /// Returns the identity bound to `phone`, creating a messaging guest on
    /// first contact.
    ///
    /// The boolean is `true` when the identity was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError`] on storage failure or when no link
    /// code could be issued.
    pub async fn ensure_for_phone(
        &self,
        phone: &PhoneNumber,
    ) -> IdentityRegistryResult<(Identity, bool)> {
        if let Some(existing) = self.repository.find_by_phone(phone).await? {
            return Ok((existing, false));
        }

        let created = self
            .store_with_fresh_code(|code, clock| {
                Identity::new_messaging_guest(phone.clone(), code, clock)
            })
            .await;
        match created {
            Ok(identity) => {
                tracing::info!(identity_id = %identity.id(), "messaging guest created on first contact");
                Ok((identity, true))
            }
            // A concurrent first contact for the same phone won the insert.
            Err(IdentityRegistryError::Repository(IdentityRepositoryError::DuplicatePhone(_))) => {
                let existing = self
                    .repository
                    .find_by_phone(phone)
                    .await?
                    .ok_or_else(|| IdentityRepositoryError::DuplicatePhone(phone.clone()))?;
                Ok((existing, false))
            }
            Err(err) => Err(err),
        }
    }

    /// Finds an identity by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: IdentityId) -> IdentityRegistryResult<Option<Identity>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Finds the identity bound to `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError::Repository`] when the lookup fails.
    pub async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> IdentityRegistryResult<Option<Identity>> {
        Ok(self.repository.find_by_phone(phone).await?)
    }

    /// Finds the identity holding exactly `code`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError::Repository`] when the lookup fails.
    pub async fn find_by_link_code(
        &self,
        code: &LinkCode,
    ) -> IdentityRegistryResult<Option<Identity>> {
        Ok(self.resolver.resolve(code).await?)
    }

    /// Binds `phone` to `source`, marks it linked and consumes its code.
    ///
    /// The write is conditional on `source` still holding the link code it
    /// was read with.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::LinkCodeConsumed`] (wrapped) when
    /// the code was consumed concurrently or `source` carries no code,
    /// [`IdentityRepositoryError::PhoneConflict`] when `phone` belongs to
    /// another identity at commit time, and
    /// [`IdentityDomainError::AlreadyLinked`] when `source` is linked.
    pub async fn promote_to_linked(
        &self,
        source: &Identity,
        phone: PhoneNumber,
    ) -> IdentityRegistryResult<Identity> {
        let redeemed_code = source
            .link_code()
            .cloned()
            .ok_or(IdentityRepositoryError::LinkCodeConsumed(source.id()))?;
        let promoted = self.prepare_promotion(source, phone)?;

        let committed = self
            .repository
            .commit_promotion(&promoted, &redeemed_code)
            .await?;
        tracing::info!(identity_id = %committed.id(), "identity promoted to linked");
        Ok(committed)
    }

    /// Returns `source` as it reads once linked to `phone`, without storing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::AlreadyLinked`] when `source` is linked.
    pub fn prepare_promotion(
        &self,
        source: &Identity,
        phone: PhoneNumber,
    ) -> IdentityRegistryResult<Identity> {
        let mut promoted = source.clone();
        promoted.promote_to_linked(phone, &*self.clock)?;
        Ok(promoted)
    }

    /// Deletes an identity whose tasks have already been migrated.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRegistryError::StillOwnsTasks`] when the identity
    /// still owns tasks and [`IdentityRepositoryError::NotFound`] (wrapped)
    /// when it does not exist.
    pub async fn delete_identity(&self, id: IdentityId) -> IdentityRegistryResult<()> {
        let count = self.ownership.count_owned_by(id).await?;
        if count > 0 {
            tracing::error!(identity_id = %id, count, "refusing to delete identity that owns tasks");
            return Err(IdentityRegistryError::StillOwnsTasks { id, count });
        }
        match self.repository.delete(id).await {
            Ok(()) => Ok(()),
            Err(IdentityRepositoryError::StillOwnsTasks(_)) => {
                Err(IdentityRegistryError::StillOwnsTasks { id, count: 1 })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Stores the identity built around a fresh code.
    ///
    /// Every attempt draws exactly one candidate. A candidate that is
    /// already held, or taken between the check and the insert, uses up the
    /// attempt.
    async fn store_with_fresh_code<F>(&self, build: F) -> IdentityRegistryResult<Identity>
    where
        F: Fn(LinkCode, &C) -> Identity,
    {
        let attempts = self.resolver.max_attempts();
        for attempt in 1..=attempts {
            let Some(code) = self.resolver.draw().await? else {
                tracing::debug!(attempt, "link code candidate already issued");
                continue;
            };
            let identity = build(code, &*self.clock);
            match self.repository.store(&identity).await {
                Ok(()) => return Ok(identity),
                Err(IdentityRepositoryError::DuplicateLinkCode(taken)) => {
                    tracing::debug!(attempt, code = %taken, "link code taken between check and insert");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(IdentityRegistryError::LinkCodeSpaceExhausted { attempts })
    }
}
