//! Results of link redemption and status lookups.

use crate::identity::domain::{Identity, IdentityId, PhoneNumber};
use serde::{Deserialize, Serialize};

/// What a successful redemption did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAction {
    /// The code's identity was promoted in place.
    Promoted,
    /// A guest holding the phone was merged into the code's identity.
    Merged,
}

impl LinkAction {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Promoted => "promoted",
            Self::Merged => "merged",
        }
    }
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Canonical identity after the merge.
    pub identity: Identity,
    /// Merge action taken.
    pub action: LinkAction,
    /// Number of tasks re-pointed to the canonical identity by this call.
    pub migrated_tasks: u64,
}

/// Whether a phone is linked to a canonical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    /// Normalized phone that was looked up.
    pub phone: PhoneNumber,
    /// Linked identity holding the phone, if any.
    pub identity_id: Option<IdentityId>,
}

impl LinkStatus {
    /// Builds the status from the identity currently holding `phone`.
    ///
    /// A guest holding the phone does not count as linked.
    #[must_use]
    pub fn from_holder(phone: PhoneNumber, holder: Option<&Identity>) -> Self {
        let identity_id = holder
            .filter(|identity| identity.is_linked())
            .map(Identity::id);
        Self { phone, identity_id }
    }

    /// Returns `true` when a linked identity holds the phone.
    #[must_use]
    pub const fn linked(&self) -> bool {
        self.identity_id.is_some()
    }
}
