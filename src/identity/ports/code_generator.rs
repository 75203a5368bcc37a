//! Port for minting link code candidates.

use crate::identity::domain::LinkCode;

/// Source of unpredictable link code candidates.
///
/// Candidates are not guaranteed to be unused; uniqueness is checked by the
/// link code resolver and enforced by the identity store.
pub trait LinkCodeGenerator: Send + Sync {
    /// Returns a new candidate code.
    fn generate(&self) -> LinkCode;
}
