//! Error types for identity domain validation and parsing.

use super::IdentityId;
use thiserror::Error;

/// Errors returned while constructing identity domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The phone number is empty after trimming.
    #[error("phone is required")]
    EmptyPhone,

    /// The phone number is not a dialable number.
    #[error("invalid phone '{0}', expected 5 to 20 digits with an optional leading '+'")]
    InvalidPhone(String),

    /// The link code is empty after trimming.
    #[error("code is required")]
    EmptyLinkCode,

    /// The link code does not match the issued code format.
    #[error("invalid link code '{0}', expected 8 characters from A-Z and 0-9")]
    InvalidLinkCode(String),

    /// The identity has already been linked and cannot be promoted again.
    #[error("identity {0} is already linked")]
    AlreadyLinked(IdentityId),
}

/// Error returned while parsing identity kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown identity kind: {0}")]
pub struct ParseIdentityKindError(pub String);

/// Error returned while parsing origin channels from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown origin channel: {0}")]
pub struct ParseOriginChannelError(pub String);
