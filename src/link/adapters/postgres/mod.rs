//! `PostgreSQL` merge commits.

mod merge;

pub use merge::PostgresMergeStore;
