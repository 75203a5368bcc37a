//! Merge case selection.

use crate::identity::domain::{Identity, IdentityId, PhoneNumber};
use thiserror::Error;

/// How a redemption reconciles the code's identity with the phone's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeCase {
    /// No other identity holds the phone; the code's identity is promoted.
    Promote,
    /// A guest holds the phone. Its tasks move to the code's identity, it is
    /// deleted, and the code's identity is promoted.
    ///
    /// The code's identity survives: it is the one a person deliberately
    /// claimed, while the phone's guest was created implicitly on first
    /// contact.
    AbsorbGuest {
        /// Guest that will be merged away.
        guest: IdentityId,
    },
}

/// Reasons a redemption is refused before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeConflict {
    /// The phone already belongs to a linked identity.
    #[error("phone is already linked to identity {existing}")]
    AlreadyLinked {
        /// Linked identity holding the phone.
        existing: IdentityId,
    },
    /// The code belongs to a guest bound to a different phone.
    #[error("link code of identity {source_id} is bound to another phone")]
    CodeBoundToOtherPhone {
        /// Identity holding the code.
        source_id: IdentityId,
    },
}

impl MergeCase {
    /// Chooses the merge case for redeeming `source`'s code from `phone`.
    ///
    /// `existing` is the identity currently holding `phone`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MergeConflict`] when the redemption must be refused.
    pub fn decide(
        source: &Identity,
        existing: Option<&Identity>,
        phone: &PhoneNumber,
    ) -> Result<Self, MergeConflict> {
        if source.is_linked() {
            return Err(MergeConflict::AlreadyLinked {
                existing: source.id(),
            });
        }
        if source.phone().is_some_and(|bound| bound != phone) {
            return Err(MergeConflict::CodeBoundToOtherPhone {
                source_id: source.id(),
            });
        }

        match existing {
            None => Ok(Self::Promote),
            Some(holder) if holder.id() == source.id() => Ok(Self::Promote),
            Some(holder) if holder.is_linked() => Err(MergeConflict::AlreadyLinked {
                existing: holder.id(),
            }),
            Some(guest) => Ok(Self::AbsorbGuest { guest: guest.id() }),
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Promote => "promote",
            Self::AbsorbGuest { .. } => "absorb_guest",
        }
    }
}
