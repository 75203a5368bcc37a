//! Shared `PostgreSQL` plumbing for the Diesel adapters.
//!
//! Every bounded context keeps its own schema and repository; this module
//! only owns the connection pool type and the schema bootstrap.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::QueryResult;

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema migrations in application order, as `(name, up.sql)` pairs.
///
/// Each script is idempotent so it can run on every startup.
pub const SCHEMA_MIGRATIONS: [(&str, &str); 3] = [
    (
        "2026-10-01-000000_create_identities",
        include_str!("../migrations/2026-10-01-000000_create_identities/up.sql"),
    ),
    (
        "2026-10-01-000001_create_tasks",
        include_str!("../migrations/2026-10-01-000001_create_tasks/up.sql"),
    ),
    (
        "2026-10-01-000002_create_conversation_sessions",
        include_str!("../migrations/2026-10-01-000002_create_conversation_sessions/up.sql"),
    ),
];

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot establish its first
/// connection.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Applies every schema migration on `connection`.
///
/// # Errors
///
/// Returns the Diesel error of the first failing script.
pub fn apply_schema(connection: &mut PgConnection) -> QueryResult<()> {
    for (name, sql) in SCHEMA_MIGRATIONS {
        tracing::debug!(migration = name, "applying schema migration");
        connection.batch_execute(sql)?;
    }
    Ok(())
}

/// Applies the schema using a pooled connection on the blocking thread pool.
///
/// # Errors
///
/// Returns an error when no connection can be checked out or a script fails.
pub async fn apply_schema_with_pool(pool: &PgPool) -> eyre::Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> eyre::Result<()> {
        let mut connection = pool.get()?;
        apply_schema(&mut connection)?;
        Ok(())
    })
    .await?
}
