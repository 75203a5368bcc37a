//! Port for committing a link as one atomic unit.

use crate::identity::domain::{Identity, IdentityId, LinkCode, PhoneNumber};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for merge store operations.
pub type MergeStoreResult<T> = Result<T, MergeStoreError>;

/// Writes planned by the merge engine for one redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// The code's identity as it will be stored once linked.
    pub survivor: Identity,
    /// Phone being bound to the survivor.
    pub phone: PhoneNumber,
    /// Code the survivor held when the plan was made.
    pub redeemed_code: LinkCode,
    /// Guest holding `phone` that is folded into the survivor, if any.
    pub absorbed_guest: Option<IdentityId>,
}

/// Atomic link commit.
///
/// # Implementation Notes
///
/// [`MergeStore::commit_merge`] applies a plan completely or not at all.
/// Within one atomic unit it must:
/// 1. check that the survivor still holds `redeemed_code`
/// 2. check that `phone` is still held by `absorbed_guest` (or, without a
///    guest, by nobody but the survivor)
/// 3. re-point every task of the absorbed guest to the survivor
/// 4. delete the absorbed guest
/// 5. store the survivor, which clears the code
///
/// Of two concurrent commits redeeming the same code exactly one succeeds,
/// and the loser leaves no trace. A task insert for the absorbed guest either
/// commits before step 3, and is migrated, or fails because its owner is gone.
#[async_trait]
pub trait MergeStore: Send + Sync {
    /// Commits `plan` and returns the number of tasks migrated.
    ///
    /// # Errors
    ///
    /// Returns [`MergeStoreError::CodeConsumed`] when the survivor no longer
    /// holds the code (or no longer exists),
    /// [`MergeStoreError::PhoneHolderChanged`] when the phone changed hands
    /// after the plan was made, and [`MergeStoreError::Persistence`] on
    /// storage failure. Nothing is written in any of these cases.
    async fn commit_merge(&self, plan: &MergePlan) -> MergeStoreResult<u64>;
}

/// Errors returned by merge store implementations.
#[derive(Debug, Clone, Error)]
pub enum MergeStoreError {
    /// The link code was consumed before this commit.
    #[error("link code for identity {0} was already consumed")]
    CodeConsumed(IdentityId),

    /// The phone is no longer held by the identity the plan expected.
    #[error("holder of phone {0} changed before the merge committed")]
    PhoneHolderChanged(PhoneNumber),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MergeStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
