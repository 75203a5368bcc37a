//! Domain model for identities and their link codes.
//!
//! Identities start as guests holding a single-use link code and are linked
//! to a phone exactly once. No infrastructure concerns cross this boundary.

mod error;
mod identity;
mod ids;
mod link_code;
mod phone;

pub use error::{IdentityDomainError, ParseIdentityKindError, ParseOriginChannelError};
pub use identity::{Identity, IdentityKind, OriginChannel, PersistedIdentityData};
pub use ids::IdentityId;
pub use link_code::LinkCode;
pub use phone::PhoneNumber;
