//! Repository port for identity persistence and lookup.

use crate::identity::domain::{Identity, IdentityId, LinkCode, PhoneNumber};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity repository operations.
pub type IdentityRepositoryResult<T> = Result<T, IdentityRepositoryError>;

/// Identity persistence contract.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - At most one identity holds a given phone at any time
/// - At most one identity holds a given link code at any time
/// - [`IdentityRepository::commit_promotion`] is an atomic compare-and-clear
///   on the link code: of two concurrent promotions redeeming the same code,
///   exactly one succeeds
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Stores a new identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::DuplicateIdentity`],
    /// [`IdentityRepositoryError::DuplicatePhone`] or
    /// [`IdentityRepositoryError::DuplicateLinkCode`] when a uniqueness
    /// constraint would be violated.
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()>;

    /// Finds an identity by identifier.
    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>>;

    /// Finds the identity currently bound to `phone`.
    async fn find_by_phone(&self, phone: &PhoneNumber)
    -> IdentityRepositoryResult<Option<Identity>>;

    /// Finds the identity holding exactly `code`.
    async fn find_by_link_code(&self, code: &LinkCode)
    -> IdentityRepositoryResult<Option<Identity>>;

    /// Persists a promotion computed by the caller, consuming `redeemed_code`.
    ///
    /// The write only applies while the stored identity still holds
    /// `redeemed_code`; this is the single commit point of a link.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::NotFound`] when the identity does
    /// not exist, [`IdentityRepositoryError::LinkCodeConsumed`] when the
    /// stored code no longer matches, and
    /// [`IdentityRepositoryError::PhoneConflict`] when another identity owns
    /// the promoted phone at commit time.
    async fn commit_promotion(
        &self,
        promoted: &Identity,
        redeemed_code: &LinkCode,
    ) -> IdentityRepositoryResult<Identity>;

    /// Removes an identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::NotFound`] when the identity does
    /// not exist and [`IdentityRepositoryError::StillOwnsTasks`] when the
    /// store can see tasks still owned by it.
    async fn delete(&self, id: IdentityId) -> IdentityRepositoryResult<()>;
}

/// Errors returned by identity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityRepositoryError {
    /// An identity with the same identifier already exists.
    #[error("duplicate identity identifier: {0}")]
    DuplicateIdentity(IdentityId),

    /// Another identity already holds the phone.
    #[error("phone already registered: {0}")]
    DuplicatePhone(PhoneNumber),

    /// Another identity already holds the link code.
    #[error("link code already issued: {0}")]
    DuplicateLinkCode(LinkCode),

    /// The identity was not found.
    #[error("identity not found: {0}")]
    NotFound(IdentityId),

    /// The link code was consumed before this promotion committed.
    #[error("link code for identity {0} was already consumed")]
    LinkCodeConsumed(IdentityId),

    /// The phone was bound to another identity before this promotion committed.
    #[error("phone {0} is bound to another identity")]
    PhoneConflict(PhoneNumber),

    /// The identity still owns tasks and cannot be deleted.
    #[error("identity {0} still owns tasks")]
    StillOwnsTasks(IdentityId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
