//! Guest and linked identities.
//!
//! Every caller is an identity: web visitors and first-time messaging
//! contacts start as guests holding a single-use link code, and a guest is
//! promoted to a linked identity bound to one phone when its code is
//! redeemed. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Registry and code resolution services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
