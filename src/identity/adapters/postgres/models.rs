//! Diesel row models for identity persistence.

use super::schema::identities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for identity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IdentityRow {
    /// Internal identity identifier.
    pub id: uuid::Uuid,
    /// Identity kind.
    pub kind: String,
    /// Bound phone, if any.
    pub phone: Option<String>,
    /// Unconsumed link code, if any.
    pub link_code: Option<String>,
    /// Channel of first contact.
    pub created_via: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for identity records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = identities)]
pub struct NewIdentityRow {
    /// Internal identity identifier.
    pub id: uuid::Uuid,
    /// Identity kind.
    pub kind: String,
    /// Bound phone, if any.
    pub phone: Option<String>,
    /// Unconsumed link code, if any.
    pub link_code: Option<String>,
    /// Channel of first contact.
    pub created_via: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
