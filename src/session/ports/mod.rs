//! Port contracts for session storage.

pub mod repository;

pub use repository::{SessionRepository, SessionRepositoryError, SessionRepositoryResult};
