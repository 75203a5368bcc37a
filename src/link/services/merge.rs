//! Merge engine: redeems link codes and reconciles identities.

use crate::identity::{
    domain::{IdentityDomainError, LinkCode, PhoneNumber},
    ports::IdentityRepository,
    services::{IdentityRegistryError, IdentityRegistryService},
};
use crate::link::domain::{LinkAction, LinkOutcome, LinkStatus, MergeCase, MergeConflict};
use crate::link::ports::{MergePlan, MergeStore, MergeStoreError};
use crate::task::ports::OwnershipMigrator;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Number of times a redemption is re-planned after the phone changed hands
/// between planning and commit.
const MAX_PLAN_ATTEMPTS: usize = 3;

/// Request to redeem `code` from `phone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    phone: String,
    code: String,
}

impl LinkRequest {
    /// Creates a request from raw, unvalidated input.
    #[must_use]
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
        }
    }
}

/// Errors returned by the merge engine.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The phone or code is missing or malformed.
    #[error(transparent)]
    Validation(#[from] IdentityDomainError),
    /// No identity holds the code, or it was consumed by another redemption.
    #[error("link code is invalid or has already been used")]
    InvalidCode,
    /// The phone belongs to another linked identity.
    #[error("phone {phone} is already linked to another identity")]
    AlreadyLinked {
        /// Phone that was requested.
        phone: PhoneNumber,
    },
    /// The code belongs to a guest bound to a different phone.
    #[error("link code belongs to a different phone")]
    CodeBoundToOtherPhone,
    /// Storage failed before anything was committed; the request is safe to
    /// repeat.
    #[error("storage failure during link: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LinkError {
    /// Returns `true` when repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

impl From<IdentityRegistryError> for LinkError {
    fn from(err: IdentityRegistryError) -> Self {
        match err {
            IdentityRegistryError::Domain(domain) => Self::Validation(domain),
            other => Self::storage(other),
        }
    }
}

/// Result type for merge engine operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Redeems link codes and collapses identities.
///
/// A redemption is planned from plain reads (code holder, phone holder,
/// merge case) and then handed to the [`MergeStore`], which migrates tasks,
/// deletes an absorbed guest and promotes the survivor as one unit. A plan
/// that loses a race either fails with [`LinkError::InvalidCode`] or is
/// re-planned from fresh reads, and in neither case has it written anything.
pub struct LinkService<I, O, M, C>
where
    I: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    M: MergeStore + ?Sized,
    C: Clock + Send + Sync,
{
    registry: IdentityRegistryService<I, O, C>,
    merges: Arc<M>,
}

impl<I, O, M, C> Clone for LinkService<I, O, M, C>
where
    I: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    M: MergeStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            merges: Arc::clone(&self.merges),
        }
    }
}

impl<I, O, M, C> LinkService<I, O, M, C>
where
    I: IdentityRepository + ?Sized,
    O: OwnershipMigrator + ?Sized,
    M: MergeStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a merge engine reading through `registry` and committing
    /// through `merges`.
    #[must_use]
    pub const fn new(registry: IdentityRegistryService<I, O, C>, merges: Arc<M>) -> Self {
        Self { registry, merges }
    }

    /// Redeems a link code from a phone.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Validation`] for malformed input,
    /// [`LinkError::InvalidCode`] when the code is unknown or was consumed
    /// first by a concurrent redemption, [`LinkError::AlreadyLinked`] or
    /// [`LinkError::CodeBoundToOtherPhone`] without mutating anything, and
    /// [`LinkError::Storage`] when a store operation fails.
    pub async fn link(&self, request: LinkRequest) -> LinkResult<LinkOutcome> {
        let phone = PhoneNumber::new(request.phone)?;
        let code = LinkCode::new(request.code)?;

        for attempt in 1..=MAX_PLAN_ATTEMPTS {
            let (plan, case) = self.plan(&phone, &code).await?;
            match self.merges.commit_merge(&plan).await {
                Ok(migrated_tasks) => {
                    tracing::info!(
                        identity_id = %plan.survivor.id(),
                        case = case.label(),
                        migrated_tasks,
                        "link committed"
                    );
                    let action = match case {
                        MergeCase::Promote => LinkAction::Promoted,
                        MergeCase::AbsorbGuest { .. } => LinkAction::Merged,
                    };
                    return Ok(LinkOutcome {
                        identity: plan.survivor,
                        action,
                        migrated_tasks,
                    });
                }
                Err(MergeStoreError::CodeConsumed(source_id)) => {
                    tracing::warn!(%source_id, "link code consumed by a concurrent redemption");
                    return Err(LinkError::InvalidCode);
                }
                Err(MergeStoreError::PhoneHolderChanged(_)) => {
                    tracing::debug!(attempt, phone = %phone, "phone changed hands before commit");
                }
                Err(err) => return Err(LinkError::storage(err)),
            }
        }
        tracing::warn!(phone = %phone, "phone kept changing hands; giving up");
        Err(LinkError::storage(MergeStoreError::PhoneHolderChanged(phone)))
    }

    /// Reports whether `phone` is linked.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Validation`] for a malformed phone and
    /// [`LinkError::Storage`] when the lookup fails.
    pub async fn link_status(&self, raw_phone: &str) -> LinkResult<LinkStatus> {
        let phone = PhoneNumber::new(raw_phone)?;
        let holder = self.registry.find_by_phone(&phone).await?;
        Ok(LinkStatus::from_holder(phone, holder.as_ref()))
    }

    async fn plan(
        &self,
        phone: &PhoneNumber,
        code: &LinkCode,
    ) -> LinkResult<(MergePlan, MergeCase)> {
        let source = self
            .registry
            .find_by_link_code(code)
            .await?
            .ok_or(LinkError::InvalidCode)?;
        let existing = self.registry.find_by_phone(phone).await?;

        let case = MergeCase::decide(&source, existing.as_ref(), phone).map_err(|conflict| {
            tracing::warn!(
                source_id = %source.id(),
                phone = %phone,
                reason = %conflict,
                "link refused"
            );
            match conflict {
                MergeConflict::AlreadyLinked { .. } => LinkError::AlreadyLinked {
                    phone: phone.clone(),
                },
                MergeConflict::CodeBoundToOtherPhone { .. } => LinkError::CodeBoundToOtherPhone,
            }
        })?;

        let survivor = self.registry.prepare_promotion(&source, phone.clone())?;
        let absorbed_guest = match case {
            MergeCase::Promote => None,
            MergeCase::AbsorbGuest { guest } => Some(guest),
        };
        let plan = MergePlan {
            survivor,
            phone: phone.clone(),
            redeemed_code: code.clone(),
            absorbed_guest,
        };
        Ok((plan, case))
    }
}
