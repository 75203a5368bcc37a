//! Identity aggregate root and related lifecycle types.

use super::{
    IdentityDomainError, IdentityId, LinkCode, ParseIdentityKindError, ParseOriginChannelError,
    PhoneNumber,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Whether an identity is still anonymous or bound to a phone for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// Anonymous identity created on first contact.
    Guest,
    /// Canonical identity bound to a phone. Terminal.
    Linked,
}

impl IdentityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Linked => "linked",
        }
    }
}

impl TryFrom<&str> for IdentityKind {
    type Error = ParseIdentityKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(Self::Guest),
            "linked" => Ok(Self::Linked),
            _ => Err(ParseIdentityKindError(value.to_owned())),
        }
    }
}

/// Channel through which an identity first made contact. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginChannel {
    /// Browser session.
    Web,
    /// Messaging channel keyed by phone number.
    Messaging,
}

impl OriginChannel {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Messaging => "messaging",
        }
    }
}

impl TryFrom<&str> for OriginChannel {
    type Error = ParseOriginChannelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "messaging" => Ok(Self::Messaging),
            _ => Err(ParseOriginChannelError(value.to_owned())),
        }
    }
}

/// Identity aggregate root.
///
/// A guest carries a link code until it is linked; a linked identity carries
/// a phone and never a link code. Guests created on the web channel have no
/// phone, guests created by first contact on the messaging channel are bound
/// to the phone they wrote from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: IdentityId,
    kind: IdentityKind,
    phone: Option<PhoneNumber>,
    link_code: Option<LinkCode>,
    created_via: OriginChannel,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIdentityData {
    /// Persisted identifier.
    pub id: IdentityId,
    /// Persisted kind.
    pub kind: IdentityKind,
    /// Persisted phone, if bound.
    pub phone: Option<PhoneNumber>,
    /// Persisted link code, if not yet consumed.
    pub link_code: Option<LinkCode>,
    /// Persisted origin channel.
    pub created_via: OriginChannel,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a phone-less guest identity holding a freshly issued code.
    #[must_use]
    pub fn new_guest(origin: OriginChannel, link_code: LinkCode, clock: &impl Clock) -> Self {
        Self::guest(origin, None, link_code, clock)
    }

    /// Creates a guest for a first contact on the messaging channel.
    #[must_use]
    pub fn new_messaging_guest(phone: PhoneNumber, link_code: LinkCode, clock: &impl Clock) -> Self {
        Self::guest(OriginChannel::Messaging, Some(phone), link_code, clock)
    }

    fn guest(
        origin: OriginChannel,
        phone: Option<PhoneNumber>,
        link_code: LinkCode,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: IdentityId::new(),
            kind: IdentityKind::Guest,
            phone,
            link_code: Some(link_code),
            created_via: origin,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an identity from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIdentityData) -> Self {
        Self {
            id: data.id,
            kind: data.kind,
            phone: data.phone,
            link_code: data.link_code,
            created_via: data.created_via,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the identity identifier.
    #[must_use]
    pub const fn id(&self) -> IdentityId {
        self.id
    }

    /// Returns the identity kind.
    #[must_use]
    pub const fn kind(&self) -> IdentityKind {
        self.kind
    }

    /// Returns the bound phone, if any.
    #[must_use]
    pub const fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Returns the unconsumed link code, if any.
    #[must_use]
    pub const fn link_code(&self) -> Option<&LinkCode> {
        self.link_code.as_ref()
    }

    /// Returns the origin channel.
    #[must_use]
    pub const fn created_via(&self) -> OriginChannel {
        self.created_via
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once the identity has been linked.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.kind == IdentityKind::Linked
    }

    /// Binds `phone`, marks the identity linked and consumes its link code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::AlreadyLinked`] when the identity is
    /// already linked; linking happens exactly once.
    pub fn promote_to_linked(
        &mut self,
        phone: PhoneNumber,
        clock: &impl Clock,
    ) -> Result<(), IdentityDomainError> {
        if self.is_linked() {
            return Err(IdentityDomainError::AlreadyLinked(self.id));
        }
        self.phone = Some(phone);
        self.kind = IdentityKind::Linked;
        self.link_code = None;
        self.updated_at = clock.utc();
        Ok(())
    }
}
