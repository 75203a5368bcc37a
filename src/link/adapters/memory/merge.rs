//! In-memory merge store.

use async_trait::async_trait;

use crate::identity::adapters::memory::IdentityTable;
use crate::link::ports::{MergePlan, MergeStore, MergeStoreError, MergeStoreResult};
use crate::memory::InMemoryStore;
use crate::task::adapters::memory::migrate_tasks;

/// Merge store over an [`InMemoryStore`].
///
/// The whole commit runs under the store's write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMergeStore {
    store: InMemoryStore,
}

impl InMemoryMergeStore {
    /// Creates a merge store over `store`.
    #[must_use]
    pub fn with_store(store: &InMemoryStore) -> Self {
        Self {
            store: store.clone(),
        }
    }
}

/// Checks that `plan` still matches what is stored.
fn verify(table: &IdentityTable, plan: &MergePlan) -> MergeStoreResult<()> {
    let survivor = plan.survivor.id();
    let holds_code = table
        .get(survivor)
        .is_some_and(|stored| stored.link_code() == Some(&plan.redeemed_code));
    if !holds_code {
        return Err(MergeStoreError::CodeConsumed(survivor));
    }

    let holder = table.holder_of_phone(&plan.phone);
    let expected = match (holder, plan.absorbed_guest) {
        (None, None) => true,
        (Some(current), None) => current == survivor,
        (Some(current), Some(guest)) => {
            current == guest && table.get(guest).is_some_and(|stored| !stored.is_linked())
        }
        (None, Some(_)) => false,
    };
    if !expected {
        return Err(MergeStoreError::PhoneHolderChanged(plan.phone.clone()));
    }
    Ok(())
}

#[async_trait]
impl MergeStore for InMemoryMergeStore {
    async fn commit_merge(&self, plan: &MergePlan) -> MergeStoreResult<u64> {
        let mut tables = self.store.write().map_err(MergeStoreError::persistence)?;
        verify(&tables.identities, plan)?;

        let survivor = plan.survivor.id();
        let moved = match plan.absorbed_guest {
            Some(guest) => {
                let count = migrate_tasks(&mut tables.tasks, guest, survivor);
                tables.identities.remove(guest);
                count
            }
            None => 0,
        };
        tables.identities.put(plan.survivor.clone());
        Ok(moved)
    }
}
