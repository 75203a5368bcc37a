//! Domain model for link redemption.

mod case;
mod outcome;

pub use case::{MergeCase, MergeConflict};
pub use outcome::{LinkAction, LinkOutcome, LinkStatus};
