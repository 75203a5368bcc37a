//! Port contracts for link redemption.
//!
//! Ports define infrastructure-agnostic interfaces used by the merge engine.

pub mod merge_store;

pub use merge_store::{MergePlan, MergeStore, MergeStoreError, MergeStoreResult};
