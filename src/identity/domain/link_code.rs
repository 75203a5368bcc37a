//! Short, human-relayable single-use link codes.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-use code that lets a second channel claim a guest identity.
///
/// Codes are matched exactly against the dedicated `link_code` field of an
/// identity. Input is case-insensitive; the stored form is upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkCode(String);

impl LinkCode {
    /// Number of characters in every issued code.
    pub const LENGTH: usize = 8;
    /// Characters codes are drawn from.
    pub const ALPHABET: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Parses a user-supplied code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyLinkCode`] for blank input and
    /// [`IdentityDomainError::InvalidLinkCode`] when the normalized value has
    /// the wrong length or characters outside [`Self::ALPHABET`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(IdentityDomainError::EmptyLinkCode);
        }
        let is_valid = normalized.len() == Self::LENGTH
            && normalized.chars().all(|ch| Self::ALPHABET.contains(ch));
        if !is_valid {
            return Err(IdentityDomainError::InvalidLinkCode(raw));
        }
        Ok(Self(normalized))
    }

    /// Builds a code by drawing each character with `pick`.
    ///
    /// `pick` receives the alphabet size and returns an index below it;
    /// out-of-range indices fall back to the first alphabet character.
    #[must_use]
    pub fn generate_with(mut pick: impl FnMut(usize) -> usize) -> Self {
        let alphabet = Self::ALPHABET.as_bytes();
        let code = (0..Self::LENGTH)
            .map(|_| {
                let byte = alphabet.get(pick(alphabet.len())).copied();
                char::from(byte.unwrap_or(b'A'))
            })
            .collect();
        Self(code)
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LinkCode {
    type Error = IdentityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LinkCode> for String {
    fn from(value: LinkCode) -> Self {
        value.0
    }
}

impl AsRef<str> for LinkCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LinkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
