//! Port contracts for identity management.
//!
//! Ports define infrastructure-agnostic interfaces used by identity services.

pub mod code_generator;
pub mod repository;

pub use code_generator::LinkCodeGenerator;
pub use repository::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult};
