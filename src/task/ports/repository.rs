//! Repository ports for task persistence and ownership migration.

use crate::identity::domain::IdentityId;
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// The insert is conditional on the owner existing when it commits, so
    /// a task never outlives a concurrent delete or merge of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists and [`TaskRepositoryError::UnknownOwner`] when the owner does
    /// not exist.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// The write only applies while the stored task is still owned by
    /// `task.owner_id()`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task with that ID is
    /// owned by the task's owner.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: IdentityId) -> TaskRepositoryResult<Vec<Task>>;

    /// Deletes the task `id` when it is owned by `owner`.
    ///
    /// Returns `false` when no such task exists.
    async fn delete_owned(&self, owner: IdentityId, id: TaskId) -> TaskRepositoryResult<bool>;

    /// Deletes the subset of `ids` owned by `owner` and returns how many rows
    /// were removed. Tasks owned by other identities are left untouched.
    async fn delete_many_owned(
        &self,
        owner: IdentityId,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<u64>;
}

/// Bulk ownership operations used when two identities are merged.
///
/// # Implementation Notes
///
/// [`OwnershipMigrator::migrate_ownership`] must be a single set-based
/// write: either every task of `from` is re-pointed or none is. Running it
/// again with the same arguments affects zero tasks.
#[async_trait]
pub trait OwnershipMigrator: Send + Sync {
    /// Re-points every task owned by `from` to `to` and returns the number
    /// of tasks moved.
    async fn migrate_ownership(&self, from: IdentityId, to: IdentityId)
    -> TaskRepositoryResult<u64>;

    /// Counts the tasks owned by `owner`.
    async fn count_owned_by(&self, owner: IdentityId) -> TaskRepositoryResult<u64>;
}

/// Storage that serves both task CRUD and ownership migration.
pub trait TaskStore: TaskRepository + OwnershipMigrator {}

impl<T> TaskStore for T where T: TaskRepository + OwnershipMigrator + ?Sized {}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The owning identity does not exist.
    #[error("owner not found: {0}")]
    UnknownOwner(IdentityId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
