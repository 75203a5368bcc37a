//! `PostgreSQL` merge store.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::identity::adapters::postgres::schema::identities;
use crate::identity::domain::{IdentityId, IdentityKind};
use crate::link::ports::{MergePlan, MergeStore, MergeStoreError, MergeStoreResult};
use crate::postgres::PgPool;
use crate::task::adapters::postgres::migrate_rows;

/// Merge store committing each plan in one transaction.
///
/// The survivor's row is locked `FOR UPDATE` before the code is checked, so
/// a concurrent commit for the same code waits and then finds it consumed.
/// The absorbed guest's row is locked the same way, which orders the
/// migration against task inserts holding `FOR SHARE` on it.
#[derive(Debug, Clone)]
pub struct PostgresMergeStore {
    pool: PgPool,
}

impl PostgresMergeStore {
    /// Creates a merge store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> MergeStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MergeStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MergeStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(MergeStoreError::persistence)?
    }
}

impl From<DieselError> for MergeStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl MergeStore for PostgresMergeStore {
    async fn commit_merge(&self, plan: &MergePlan) -> MergeStoreResult<u64> {
        let planned = plan.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, MergeStoreError, _>(|tx| commit(tx, &planned))
        })
        .await
    }
}

fn commit(tx: &mut PgConnection, plan: &MergePlan) -> MergeStoreResult<u64> {
    let survivor = plan.survivor.id();
    let held_code = identities::table
        .filter(identities::id.eq(survivor.into_inner()))
        .select(identities::link_code)
        .for_update()
        .first::<Option<String>>(tx)
        .optional()?
        .flatten();
    if held_code.as_deref() != Some(plan.redeemed_code.as_str()) {
        return Err(MergeStoreError::CodeConsumed(survivor));
    }

    let holder = identities::table
        .filter(identities::phone.eq(plan.phone.as_str()))
        .select((identities::id, identities::kind))
        .for_update()
        .first::<(uuid::Uuid, String)>(tx)
        .optional()?;
    if !holder_matches(holder, survivor, plan.absorbed_guest) {
        return Err(MergeStoreError::PhoneHolderChanged(plan.phone.clone()));
    }

    let moved = match plan.absorbed_guest {
        Some(guest) => {
            let count = migrate_rows(tx, guest, survivor)?;
            diesel::delete(identities::table.filter(identities::id.eq(guest.into_inner())))
                .execute(tx)?;
            count
        }
        None => 0,
    };

    diesel::update(identities::table.filter(identities::id.eq(survivor.into_inner())))
        .set((
            identities::kind.eq(plan.survivor.kind().as_str()),
            identities::phone.eq(plan.phone.as_str()),
            identities::link_code.eq(plan.survivor.link_code().map(|code| code.as_str())),
            identities::updated_at.eq(plan.survivor.updated_at()),
        ))
        .execute(tx)
        .map_err(|err| match err {
            // A first-contact insert took the phone after the holder check.
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                MergeStoreError::PhoneHolderChanged(plan.phone.clone())
            }
            other => MergeStoreError::persistence(other),
        })?;

    u64::try_from(moved).map_err(MergeStoreError::persistence)
}

fn holder_matches(
    holder: Option<(uuid::Uuid, String)>,
    survivor: IdentityId,
    absorbed_guest: Option<IdentityId>,
) -> bool {
    match (holder, absorbed_guest) {
        (None, None) => true,
        (Some((current, _)), None) => current == survivor.into_inner(),
        (Some((current, kind)), Some(guest)) => {
            current == guest.into_inner() && kind == IdentityKind::Guest.as_str()
        }
        (None, Some(_)) => false,
    }
}
