//! Per-owner task counts.

use super::Task;

/// Pending and completed counts for one owner, plus the newest tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// Number of tasks not yet completed.
    pub pending: usize,
    /// Number of completed tasks.
    pub completed: usize,
    /// Newest tasks first, at most the requested number.
    pub recent: Vec<Task>,
}

impl TaskSummary {
    /// Summarizes `tasks`, which must be ordered newest first, keeping the
    /// first `recent` of them.
    #[must_use]
    pub fn from_newest_first(tasks: Vec<Task>, recent: usize) -> Self {
        let completed = tasks.iter().filter(|task| task.completed()).count();
        let pending = tasks.len().saturating_sub(completed);
        let mut newest = tasks;
        newest.truncate(recent);
        Self {
            pending,
            completed,
            recent: newest,
        }
    }

    /// Returns the total number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.completed
    }
}
