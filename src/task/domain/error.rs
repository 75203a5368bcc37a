//! Error types for task domain validation.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("title is {actual} characters long, at most {max} are allowed")]
    TitleTooLong {
        /// Maximum accepted length in characters.
        max: usize,
        /// Length of the rejected title in characters.
        actual: usize,
    },
}
