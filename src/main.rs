//! `tasklink` server binary.

use clap::Parser;
use tasklink::config::ServerConfig;
use tasklink::http::{AppState, Stores, start_server};
use tasklink::postgres::{apply_schema_with_pool, build_pool};
use tasklink::telemetry;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = ServerConfig::parse();
    telemetry::init(config.log_format)?;

    let secret = config.secret();
    if !secret.is_present() {
        tracing::warn!("TASKLINK_INTERNAL_SECRET is unset; /sessions accepts unauthenticated requests");
    }

    let stores = match config.database_url.as_deref() {
        Some(url) => {
            let pool = tokio::task::spawn_blocking({
                let database_url = url.to_owned();
                let size = config.pool_size;
                move || build_pool(&database_url, size)
            })
            .await??;
            apply_schema_with_pool(&pool).await?;
            tracing::info!(pool_size = config.pool_size, "using PostgreSQL stores");
            Stores::postgres(&pool)
        }
        None => {
            tracing::info!("no database configured; using in-memory stores");
            Stores::in_memory()
        }
    };

    let server = start_server(
        config.listen_addr,
        AppState::new(stores, secret),
        config.request_timeout(),
    )
    .await?;

    tokio::select! {
        result = server.wait() => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutdown requested");
            Ok(())
        }
    }
}
