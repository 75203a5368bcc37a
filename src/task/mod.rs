//! Task records owned by identities.
//!
//! Plain task CRUD with an ownership check on every mutation, plus the bulk
//! ownership migration used when two identities are merged. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
