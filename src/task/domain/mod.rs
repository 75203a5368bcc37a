//! Domain model for task records.
//!
//! Tasks belong to exactly one identity at a time. Ownership only changes
//! when a merge migrates every task of one identity to another.

mod error;
mod ids;
mod summary;
mod task;
mod title;

pub use error::TaskDomainError;
pub use ids::TaskId;
pub use summary::TaskSummary;
pub use task::{PersistedTaskData, Task, TaskChanges};
pub use title::TaskTitle;
