//! Shared state for the in-memory adapters.
//!
//! Identity and task tables sit behind one lock so that work spanning both
//! (owner-checked task inserts, guarded identity deletes, merge commits) is
//! atomic, the way a single database transaction is for the `PostgreSQL`
//! adapters.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identity::adapters::memory::IdentityTable;
use crate::task::domain::{Task, TaskId};

/// Process-local store shared by the in-memory adapters.
///
/// Cloning is cheap and every clone sees the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

/// Tables guarded by the store lock.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) identities: IdentityTable,
    pub(crate) tasks: HashMap<TaskId, Task>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> std::io::Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    pub(crate) fn write(&self) -> std::io::Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }
}
