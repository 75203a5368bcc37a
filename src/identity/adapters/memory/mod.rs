//! In-memory adapters for identity persistence.

mod identity;

pub(crate) use identity::IdentityTable;
pub use identity::InMemoryIdentityRepository;
