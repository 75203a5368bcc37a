//! Diesel row models for session persistence.

use super::schema::conversation_sessions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for session records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = conversation_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Normalized phone.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub phone: String,
    /// Whether a conversation is in progress.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub active: bool,
    /// Opaque context payload.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub context: Value,
    /// Time of the latest activation or deactivation.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub last_interaction_at: DateTime<Utc>,
}
