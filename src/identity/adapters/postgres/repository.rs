//! `PostgreSQL` repository implementation for identity storage.

use super::{
    models::{IdentityRow, NewIdentityRow},
    schema::identities,
};
use crate::identity::{
    domain::{
        Identity, IdentityId, IdentityKind, LinkCode, OriginChannel, PersistedIdentityData,
        PhoneNumber,
    },
    ports::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult},
};
use crate::postgres::PgPool;
use crate::task::adapters::postgres::schema::tasks;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const PHONE_UNIQUE_INDEX: &str = "idx_identities_phone_unique";
const LINK_CODE_UNIQUE_INDEX: &str = "idx_identities_link_code_unique";

/// `PostgreSQL`-backed identity repository.
#[derive(Debug, Clone)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> IdentityRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> IdentityRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(IdentityRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(IdentityRepositoryError::persistence)?
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let identity_id = identity.id();
        let phone = identity.phone().cloned();
        let link_code = identity.link_code().cloned();
        let new_row = to_new_row(identity);

        self.run_blocking(move |connection| {
            diesel::insert_into(identities::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match (err, phone, link_code) {
                    (
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info),
                        Some(phone),
                        _,
                    ) if violates(info.as_ref(), PHONE_UNIQUE_INDEX) => {
                        IdentityRepositoryError::DuplicatePhone(phone)
                    }
                    (
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info),
                        _,
                        Some(code),
                    ) if violates(info.as_ref(), LINK_CODE_UNIQUE_INDEX) => {
                        IdentityRepositoryError::DuplicateLinkCode(code)
                    }
                    (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _), _, _) => {
                        IdentityRepositoryError::DuplicateIdentity(identity_id)
                    }
                    (other, _, _) => IdentityRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>> {
        self.run_blocking(move |connection| {
            let row = identities::table
                .filter(identities::id.eq(id.into_inner()))
                .select(IdentityRow::as_select())
                .first::<IdentityRow>(connection)
                .optional()
                .map_err(IdentityRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let lookup = phone.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = identities::table
                .filter(identities::phone.eq(&lookup))
                .select(IdentityRow::as_select())
                .first::<IdentityRow>(connection)
                .optional()
                .map_err(IdentityRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }

    async fn find_by_link_code(
        &self,
        code: &LinkCode,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let lookup = code.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = identities::table
                .filter(identities::link_code.eq(&lookup))
                .select(IdentityRow::as_select())
                .first::<IdentityRow>(connection)
                .optional()
                .map_err(IdentityRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }

    async fn commit_promotion(
        &self,
        promoted: &Identity,
        redeemed_code: &LinkCode,
    ) -> IdentityRepositoryResult<Identity> {
        let id = promoted.id();
        let uuid = id.into_inner();
        let expected_code = redeemed_code.as_str().to_owned();
        let kind = promoted.kind().as_str().to_owned();
        let phone = promoted.phone().cloned();
        let next_code = promoted.link_code().map(|code| code.as_str().to_owned());
        let updated_at = promoted.updated_at();
        let result = promoted.clone();

        self.run_blocking(move |connection| {
            // The link_code predicate is the compare-and-clear: a concurrent
            // redemption that committed first leaves zero matching rows.
            let updated = diesel::update(
                identities::table
                    .filter(identities::id.eq(uuid))
                    .filter(identities::link_code.eq(&expected_code)),
            )
            .set((
                identities::kind.eq(&kind),
                identities::phone.eq(phone.as_ref().map(PhoneNumber::as_str)),
                identities::link_code.eq(next_code.as_deref()),
                identities::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(|err| match (err, phone.as_ref()) {
                (
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info),
                    Some(phone),
                ) if violates(info.as_ref(), PHONE_UNIQUE_INDEX) => {
                    IdentityRepositoryError::PhoneConflict(phone.clone())
                }
                (other, _) => IdentityRepositoryError::persistence(other),
            })?;

            if updated == 0 {
                return Err(if identity_exists(connection, uuid)? {
                    IdentityRepositoryError::LinkCodeConsumed(id)
                } else {
                    IdentityRepositoryError::NotFound(id)
                });
            }
            Ok(result)
        })
        .await
    }

    async fn delete(&self, id: IdentityId) -> IdentityRepositoryResult<()> {
        let uuid = id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, IdentityRepositoryError, _>(|tx| {
                // The row lock waits for task inserts holding FOR SHARE on
                // this owner; the count below then sees their rows.
                let locked = identities::table
                    .filter(identities::id.eq(uuid))
                    .select(identities::id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if locked.is_none() {
                    return Err(IdentityRepositoryError::NotFound(id));
                }

                let owned: i64 = tasks::table
                    .filter(tasks::owner_id.eq(uuid))
                    .count()
                    .get_result(tx)?;
                if owned > 0 {
                    return Err(IdentityRepositoryError::StillOwnsTasks(id));
                }

                diesel::delete(identities::table.filter(identities::id.eq(uuid))).execute(tx)?;
                Ok(())
            })
        })
        .await
    }
}

impl From<DieselError> for IdentityRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn to_new_row(identity: &Identity) -> NewIdentityRow {
    NewIdentityRow {
        id: identity.id().into_inner(),
        kind: identity.kind().as_str().to_owned(),
        phone: identity.phone().map(|phone| phone.as_str().to_owned()),
        link_code: identity.link_code().map(|code| code.as_str().to_owned()),
        created_via: identity.created_via().as_str().to_owned(),
        created_at: identity.created_at(),
        updated_at: identity.updated_at(),
    }
}

fn row_to_identity(row: IdentityRow) -> IdentityRepositoryResult<Identity> {
    let IdentityRow {
        id,
        kind,
        phone,
        link_code,
        created_via,
        created_at,
        updated_at,
    } = row;

    let data = PersistedIdentityData {
        id: IdentityId::from_uuid(id),
        kind: IdentityKind::try_from(kind.as_str())
            .map_err(IdentityRepositoryError::persistence)?,
        phone: phone
            .map(PhoneNumber::new)
            .transpose()
            .map_err(IdentityRepositoryError::persistence)?,
        link_code: link_code
            .map(LinkCode::new)
            .transpose()
            .map_err(IdentityRepositoryError::persistence)?,
        created_via: OriginChannel::try_from(created_via.as_str())
            .map_err(IdentityRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Identity::from_persisted(data))
}

fn identity_exists(connection: &mut PgConnection, uuid: uuid::Uuid) -> IdentityRepositoryResult<bool> {
    diesel::select(diesel::dsl::exists(
        identities::table.filter(identities::id.eq(uuid)),
    ))
    .get_result(connection)
    .map_err(IdentityRepositoryError::persistence)
}

fn violates(info: &dyn DatabaseErrorInformation, index: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == index)
}
