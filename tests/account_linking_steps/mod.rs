//! Step definitions for account linking scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
