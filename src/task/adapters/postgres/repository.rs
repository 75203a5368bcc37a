//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::identity::adapters::postgres::schema::identities;
use crate::identity::domain::IdentityId;
use crate::postgres::PgPool;
use crate::task::{
    domain::{PersistedTaskData, Task, TaskId, TaskTitle},
    ports::{OwnershipMigrator, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let owner = task.owner_id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                // FOR SHARE waits out a merge or delete holding the owner row
                // and keeps the owner in place until the insert commits.
                let owner_row = identities::table
                    .filter(identities::id.eq(owner.into_inner()))
                    .select(identities::id)
                    .for_share()
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if owner_row.is_none() {
                    return Err(TaskRepositoryError::UnknownOwner(owner));
                }

                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_new_row(task);

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(row.id))
                    .filter(tasks::owner_id.eq(row.owner_id)),
            )
            .set((
                tasks::title.eq(&row.title),
                tasks::description.eq(row.description.as_deref()),
                tasks::completed.eq(row.completed),
                tasks::updated_at.eq(row.updated_at),
            ))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_by_owner(&self, owner: IdentityId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .order((tasks::created_at.desc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete_owned(&self, owner: IdentityId, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::owner_id.eq(owner.into_inner())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_many_owned(
        &self,
        owner: IdentityId,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<u64> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                tasks::table
                    .filter(tasks::owner_id.eq(owner.into_inner()))
                    .filter(tasks::id.eq_any(uuids)),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(deleted).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

#[async_trait]
impl OwnershipMigrator for PostgresTaskRepository {
    async fn migrate_ownership(
        &self,
        from: IdentityId,
        to: IdentityId,
    ) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let moved = migrate_rows(connection, from, to)?;
            u64::try_from(moved).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn count_owned_by(&self, owner: IdentityId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(count).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Re-points every task owned by `from` to `to` in one set-based `UPDATE`.
pub(crate) fn migrate_rows(
    connection: &mut PgConnection,
    from: IdentityId,
    to: IdentityId,
) -> Result<usize, DieselError> {
    if from == to {
        return Ok(0);
    }
    diesel::update(tasks::table.filter(tasks::owner_id.eq(from.into_inner())))
        .set(tasks::owner_id.eq(to.into_inner()))
        .execute(connection)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        completed: task.completed(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title,
        description,
        completed,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner_id: IdentityId::from_uuid(owner_id),
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description,
        completed,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
