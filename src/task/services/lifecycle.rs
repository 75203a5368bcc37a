//! Service layer for ownership-checked task operations.

use crate::identity::{domain::IdentityId, ports::IdentityRepository};
use crate::identity::ports::IdentityRepositoryError;
use crate::task::{
    domain::{Task, TaskChanges, TaskDomainError, TaskId, TaskSummary, TaskTitle},
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner_id: IdentityId,
    title: String,
    description: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(owner_id: IdentityId, title: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
            description: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for a partial task update made by `caller`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    caller: IdentityId,
    task_id: TaskId,
    title: Option<String>,
    description: Option<Option<String>>,
    completed: Option<bool>,
}

impl UpdateTaskRequest {
    /// Creates an update request that changes nothing yet.
    #[must_use]
    pub const fn new(caller: IdentityId, task_id: TaskId) -> Self {
        Self {
            caller,
            task_id,
            title: None,
            description: None,
            completed: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description; `None` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Identity lookup failed.
    #[error(transparent)]
    Identity(#[from] IdentityRepositoryError),
    /// The owning identity does not exist.
    #[error("identity not found: {0}")]
    UnknownOwner(IdentityId),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The caller does not own the task.
    #[error("identity {caller} does not own task {task_id}")]
    NotOwner {
        /// Task the caller tried to change.
        task_id: TaskId,
        /// Identity making the call.
        caller: IdentityId,
    },
    /// The update request changes no field.
    #[error("update must change at least one field")]
    NothingToUpdate,
    /// A bulk request named no tasks.
    #[error("at least one task id is required")]
    EmptySelection,
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task CRUD with an ownership check on every mutation.
pub struct TaskService<R, I, C>
where
    R: TaskRepository + ?Sized,
    I: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    identities: Arc<I>,
    clock: Arc<C>,
}

impl<R, I, C> Clone for TaskService<R, I, C>
where
    R: TaskRepository + ?Sized,
    I: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            identities: Arc::clone(&self.identities),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, I, C> TaskService<R, I, C>
where
    R: TaskRepository + ?Sized,
    I: IdentityRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, identities: Arc<I>, clock: Arc<C>) -> Self {
        Self {
            repository,
            identities,
            clock,
        }
    }

    /// Creates a task under an existing identity.
    ///
    /// The owner is checked up front and again by the conditional insert,
    /// which fails if the owner was merged away or deleted in between.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UnknownOwner`] when the owner does not
    /// exist and [`TaskServiceError::Domain`] for an invalid title.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        let title = TaskTitle::new(request.title)?;
        if self.identities.find_by_id(request.owner_id).await?.is_none() {
            return Err(TaskServiceError::UnknownOwner(request.owner_id));
        }

        let task = Task::new(request.owner_id, title, request.description, &*self.clock);
        match self.repository.store(&task).await {
            Ok(()) => {}
            Err(TaskRepositoryError::UnknownOwner(owner)) => {
                tracing::warn!(owner_id = %owner, "owner removed before the task was stored");
                return Err(TaskServiceError::UnknownOwner(owner));
            }
            Err(err) => return Err(err.into()),
        }
        tracing::debug!(task_id = %task.id(), owner_id = %task.owner_id(), "task created");
        Ok(task)
    }

    /// Lists the tasks owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn list_for_owner(&self, owner: IdentityId) -> TaskServiceResult<Vec<Task>> {
        Ok(self.repository.list_by_owner(owner).await?)
    }

    /// Applies a partial update to a task the caller owns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`], [`TaskServiceError::NotOwner`]
    /// or [`TaskServiceError::NothingToUpdate`].
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskServiceResult<Task> {
        let changes = TaskChanges {
            title: request.title.map(TaskTitle::new).transpose()?,
            description: request.description,
            completed: request.completed,
        };
        if changes.is_empty() {
            return Err(TaskServiceError::NothingToUpdate);
        }

        let mut task = self.owned_task(request.caller, request.task_id).await?;
        task.apply(changes, &*self.clock);
        match self.repository.update(&task).await {
            Ok(()) => Ok(task),
            // Ownership moved between the read and the conditional write.
            Err(TaskRepositoryError::NotFound(task_id)) => Err(TaskServiceError::NotOwner {
                task_id,
                caller: request.caller,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Counts the tasks owned by `owner` and returns the `recent` newest.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn summary_for_owner(
        &self,
        owner: IdentityId,
        recent: usize,
    ) -> TaskServiceResult<TaskSummary> {
        let tasks = self.repository.list_by_owner(owner).await?;
        Ok(TaskSummary::from_newest_first(tasks, recent))
    }

    /// Deletes a task the caller owns and returns it as it was stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or [`TaskServiceError::NotOwner`].
    pub async fn delete(&self, caller: IdentityId, task_id: TaskId) -> TaskServiceResult<Task> {
        let task = self.owned_task(caller, task_id).await?;
        if !self.repository.delete_owned(caller, task_id).await? {
            return Err(TaskServiceError::NotOwner { task_id, caller });
        }
        Ok(task)
    }

    /// Deletes the caller's tasks among `task_ids` and returns the count.
    ///
    /// Ids that are unknown or owned by someone else are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::EmptySelection`] when `task_ids` is empty.
    pub async fn bulk_delete(
        &self,
        caller: IdentityId,
        task_ids: &[TaskId],
    ) -> TaskServiceResult<u64> {
        if task_ids.is_empty() {
            return Err(TaskServiceError::EmptySelection);
        }
        let deleted = self.repository.delete_many_owned(caller, task_ids).await?;
        let requested = task_ids.len();
        if usize::try_from(deleted).is_ok_and(|count| count < requested) {
            tracing::warn!(
                caller = %caller,
                requested,
                deleted,
                "bulk delete skipped tasks the caller does not own"
            );
        }
        Ok(deleted)
    }

    async fn owned_task(&self, caller: IdentityId, task_id: TaskId) -> TaskServiceResult<Task> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(task_id))?;
        if !task.is_owned_by(caller) {
            tracing::warn!(caller = %caller, task_id = %task_id, "rejected mutation by non-owner");
            return Err(TaskServiceError::NotOwner { task_id, caller });
        }
        Ok(task)
    }
}
