//! In-memory adapters for task persistence.

mod task;

pub use task::InMemoryTaskRepository;
pub(crate) use task::migrate_tasks;
