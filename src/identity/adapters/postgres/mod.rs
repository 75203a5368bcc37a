//! `PostgreSQL` adapters for identity persistence.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::PostgresIdentityRepository;
