//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::identity::domain::IdentityId;
use crate::memory::{InMemoryStore, Tables};
use crate::task::{
    domain::{Task, TaskId},
    ports::{OwnershipMigrator, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Tasks live in an [`InMemoryStore`] next to the identity table. Inserts
/// check the owner under the store lock, and ownership migration runs under
/// one write lock, so readers observe either none or all of a migration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    store: InMemoryStore,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository over a private store.
    ///
    /// A private store has no identities, so [`TaskRepository::store`]
    /// rejects every owner; share a store with
    /// [`InMemoryTaskRepository::with_store`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository over `store`, sharing it with other adapters.
    #[must_use]
    pub fn with_store(store: &InMemoryStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Returns every stored task ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn snapshot(&self) -> TaskRepositoryResult<Vec<Task>> {
        let tables = self.read()?;
        let mut all: Vec<Task> = tables.tasks.values().cloned().collect();
        all.sort_by_key(Task::id);
        Ok(all)
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.store.read().map_err(TaskRepositoryError::persistence)
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.store.write().map_err(TaskRepositoryError::persistence)
    }
}

/// Re-points every task owned by `from` to `to` and returns how many moved.
pub(crate) fn migrate_tasks(
    tasks: &mut HashMap<TaskId, Task>,
    from: IdentityId,
    to: IdentityId,
) -> u64 {
    if from == to {
        return 0;
    }
    let mut moved = 0;
    for task in tasks.values_mut().filter(|task| task.is_owned_by(from)) {
        task.reassign_owner(to);
        moved += 1;
    }
    moved
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.identities.contains(task.owner_id()) {
            return Err(TaskRepositoryError::UnknownOwner(task.owner_id()));
        }
        if tables.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tables.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tables = self.write()?;
        let stored = tables
            .tasks
            .get_mut(&task.id())
            .filter(|stored| stored.is_owned_by(task.owner_id()))
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: IdentityId) -> TaskRepositoryResult<Vec<Task>> {
        let tables = self.read()?;
        let mut owned: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(owned)
    }

    async fn delete_owned(&self, owner: IdentityId, id: TaskId) -> TaskRepositoryResult<bool> {
        let mut tables = self.write()?;
        if !tables.tasks.get(&id).is_some_and(|task| task.is_owned_by(owner)) {
            return Ok(false);
        }
        tables.tasks.remove(&id);
        Ok(true)
    }

    async fn delete_many_owned(
        &self,
        owner: IdentityId,
        ids: &[TaskId],
    ) -> TaskRepositoryResult<u64> {
        let mut tables = self.write()?;
        let mut deleted = 0;
        for id in ids {
            if tables.tasks.get(id).is_some_and(|task| task.is_owned_by(owner)) {
                tables.tasks.remove(id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl OwnershipMigrator for InMemoryTaskRepository {
    async fn migrate_ownership(
        &self,
        from: IdentityId,
        to: IdentityId,
    ) -> TaskRepositoryResult<u64> {
        let mut tables = self.write()?;
        Ok(migrate_tasks(&mut tables.tasks, from, to))
    }

    async fn count_owned_by(&self, owner: IdentityId) -> TaskRepositoryResult<u64> {
        let tables = self.read()?;
        let count = tables
            .tasks
            .values()
            .filter(|task| task.is_owned_by(owner))
            .count();
        u64::try_from(count).map_err(TaskRepositoryError::persistence)
    }
}
