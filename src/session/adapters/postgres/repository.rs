//! `PostgreSQL` repository implementation for session storage.

use super::{models::SessionRow, schema::conversation_sessions};
use crate::identity::domain::PhoneNumber;
use crate::postgres::PgPool;
use crate::session::{
    domain::{ConversationSession, PersistedSessionData},
    ports::{SessionRepository, SessionRepositoryError, SessionRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Jsonb, Nullable, Text, Timestamptz};
use serde_json::Value;

/// Upsert keyed by phone. `$2` is the optional replacement context.
const ACTIVATE_SQL: &str = concat!(
    "INSERT INTO conversation_sessions (phone, active, context, last_interaction_at) ",
    "VALUES ($1, TRUE, COALESCE($2, '{}'::jsonb), $3) ",
    "ON CONFLICT (phone) DO UPDATE SET active = TRUE, ",
    "context = COALESCE($2, conversation_sessions.context), ",
    "last_interaction_at = EXCLUDED.last_interaction_at ",
    "RETURNING phone, active, context, last_interaction_at",
);

/// `PostgreSQL`-backed session repository.
#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> SessionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SessionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SessionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SessionRepositoryError::persistence)?
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn activate(
        &self,
        phone: &PhoneNumber,
        context: Option<Value>,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<ConversationSession> {
        let key = phone.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(ACTIVATE_SQL)
                .bind::<Text, _>(key)
                .bind::<Nullable<Jsonb>, _>(context)
                .bind::<Timestamptz, _>(at)
                .get_result::<SessionRow>(connection)
                .map_err(SessionRepositoryError::persistence)?;
            row_to_session(row)
        })
        .await
    }

    async fn deactivate(
        &self,
        phone: &PhoneNumber,
        at: DateTime<Utc>,
    ) -> SessionRepositoryResult<Option<ConversationSession>> {
        let key = phone.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::update(
                conversation_sessions::table.filter(conversation_sessions::phone.eq(&key)),
            )
            .set((
                conversation_sessions::active.eq(false),
                conversation_sessions::last_interaction_at.eq(at),
            ))
            .returning(SessionRow::as_returning())
            .get_result::<SessionRow>(connection)
            .optional()
            .map_err(SessionRepositoryError::persistence)?;
            row.map(row_to_session).transpose()
        })
        .await
    }

    async fn find(
        &self,
        phone: &PhoneNumber,
    ) -> SessionRepositoryResult<Option<ConversationSession>> {
        let key = phone.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = conversation_sessions::table
                .filter(conversation_sessions::phone.eq(&key))
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()
                .map_err(SessionRepositoryError::persistence)?;
            row.map(row_to_session).transpose()
        })
        .await
    }
}

fn row_to_session(row: SessionRow) -> SessionRepositoryResult<ConversationSession> {
    let SessionRow {
        phone,
        active,
        context,
        last_interaction_at,
    } = row;

    Ok(ConversationSession::from_persisted(PersistedSessionData {
        phone: PhoneNumber::new(phone).map_err(SessionRepositoryError::persistence)?,
        active,
        context,
        last_interaction_at,
    }))
}
