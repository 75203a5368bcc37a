//! In-memory merge commits.

mod merge;

pub use merge::InMemoryMergeStore;
