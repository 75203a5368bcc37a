//! Link code redemption and identity merging.
//!
//! Redeeming a guest's link code from a phone either promotes that guest to
//! the phone's linked identity or, when a messaging guest already holds the
//! phone, absorbs that guest into it. Lookups go through the identity
//! registry; the writes of a redemption are committed as one unit through
//! the [`ports::MergeStore`] port.
//!
//! - Merge decisions and outcomes in [`domain`]
//! - The atomic commit contract in [`ports`]
//! - In-memory and `PostgreSQL` commits in [`adapters`]
//! - The merge engine in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
