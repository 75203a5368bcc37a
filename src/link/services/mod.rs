//! Application services for link redemption.

mod merge;

pub use merge::{LinkError, LinkRequest, LinkResult, LinkService};
