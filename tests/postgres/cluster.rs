//! Embedded `PostgreSQL` cluster shared by every test in the binary.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use postgresql_embedded::{PostgreSQL, Settings};
use std::sync::OnceLock;
use tasklink::postgres::{PgPool, apply_schema, build_pool};
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

static CLUSTER: OnceLock<Result<Settings, String>> = OnceLock::new();

fn start_cluster() -> Result<Settings, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| err.to_string())?;
    let mut postgres = PostgreSQL::new(Settings::default());
    runtime
        .block_on(async {
            postgres.setup().await?;
            postgres.start().await
        })
        .map_err(|err| format!("failed to start PostgreSQL: {err}"))?;
    let settings = postgres.settings().clone();
    // Dropping the handle stops the server; it must outlive every test.
    std::mem::forget(postgres);
    Ok(settings)
}

fn cluster_settings() -> Result<&'static Settings, BoxError> {
    CLUSTER
        .get_or_init(start_cluster)
        .as_ref()
        .map_err(|message| BoxError::from(format!("SKIP-TEST-CLUSTER: {message}")))
}

/// A database created for one test and dropped afterwards.
pub struct TemporaryDatabase {
    name: String,
    admin_url: String,
    pub pool: PgPool,
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Ok(mut admin) = PgConnection::establish(&self.admin_url) {
            let sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
            if let Err(err) = admin.batch_execute(&sql) {
                eprintln!("failed to drop test database {}: {err}", self.name);
            }
        }
    }
}

fn provision() -> Result<TemporaryDatabase, BoxError> {
    let settings = cluster_settings()?;
    let name = format!("tasklink_{}", Uuid::new_v4().simple());
    let admin_url = settings.url("postgres");
    let mut admin = PgConnection::establish(&admin_url)?;
    admin.batch_execute(&format!("CREATE DATABASE \"{name}\""))?;

    let pool = build_pool(&settings.url(&name), 4)?;
    apply_schema(&mut *pool.get()?)?;
    Ok(TemporaryDatabase {
        name,
        admin_url,
        pool,
    })
}

/// Creates a migrated throwaway database.
///
/// # Errors
///
/// Returns an error when the cluster cannot start or the database cannot be
/// created.
pub async fn temporary_database() -> Result<TemporaryDatabase, BoxError> {
    tokio::task::spawn_blocking(provision).await?
}
