//! Port contracts for task storage.
//!
//! Ports define infrastructure-agnostic interfaces used by task services and
//! by the merge engine.

pub mod repository;

pub use repository::{
    OwnershipMigrator, TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskStore,
};
