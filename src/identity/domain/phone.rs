//! Normalized phone number used as the messaging-channel identity key.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix the messaging gateway appends to phone numbers (`<digits>@s.whatsapp.net`).
const MESSAGING_JID_SUFFIX: &str = "@s.whatsapp.net";

/// Characters dropped from user-entered numbers before validation.
const SEPARATORS: [char; 4] = [' ', '-', '(', ')'];

/// Validated phone number in canonical form: `+` followed by the full
/// international digits.
///
/// The messaging gateway sends a JID (`5511...@s.whatsapp.net`) without a
/// `+`, while the web form usually carries one (`+55 11 ...`). Both are read
/// as international numbers and normalize to the same `+<digits>` value, so
/// uniqueness holds across channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits accepted.
    pub const MIN_DIGITS: usize = 5;
    /// Maximum number of digits accepted.
    pub const MAX_DIGITS: usize = 20;

    /// Parses and normalizes a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyPhone`] for blank input and
    /// [`IdentityDomainError::InvalidPhone`] when the digits are out of range
    /// or contain other characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityDomainError::EmptyPhone);
        }

        let without_suffix = trimmed
            .strip_suffix(MESSAGING_JID_SUFFIX)
            .unwrap_or(trimmed);
        let compact: String = without_suffix
            .chars()
            .filter(|ch| !SEPARATORS.contains(ch))
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        let is_valid = (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len())
            && digits.chars().all(|ch| ch.is_ascii_digit());

        if !is_valid {
            return Err(IdentityDomainError::InvalidPhone(raw));
        }
        Ok(Self(format!("+{digits}")))
    }

    /// Returns the canonical phone value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = IdentityDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
