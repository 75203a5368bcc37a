//! Application services for identity management.

mod registry;
mod resolver;

pub use registry::{IdentityRegistryError, IdentityRegistryResult, IdentityRegistryService};
pub use resolver::{DEFAULT_ISSUE_ATTEMPTS, LinkCodeResolver};
