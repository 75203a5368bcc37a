//! HTTP surface.
//!
//! Public routes cover link redemption, identities and tasks. The
//! `/sessions` and `/webhook` routes are internal and require the shared
//! secret when one is configured.

mod auth;
mod error;
mod identities;
mod link;
mod sessions;
pub mod state;
mod tasks;
mod webhook;

pub use auth::SECRET_HEADER;
pub use error::{ApiError, ApiResult};
pub use state::{AppState, Stores};

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
};
use eyre::WrapErr;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Builds the router over `state`; requests running longer than `timeout`
/// are answered with `408`.
pub fn router(state: AppState, timeout: Duration) -> Router {
    let internal = Router::new()
        .route(
            "/sessions",
            get(sessions::get_active)
                .post(sessions::activate)
                .delete(sessions::deactivate),
        )
        .route("/webhook", post(webhook::handle))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_secret,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/link", post(link::redeem).get(link::status))
        .route("/identities/guest", post(identities::create_guest))
        .route("/identities/messaging", post(identities::ensure_messaging))
        .route("/identities/{id}", get(identities::get_identity))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/bulk-delete", post(tasks::bulk_delete))
        .route("/tasks/{id}", patch(tasks::update).delete(tasks::delete))
        .merge(internal)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A running server. Dropping it aborts the server task.
pub struct StartedServer {
    /// Address the listener is bound to.
    pub addr: SocketAddr,
    handle: Option<tokio::task::JoinHandle<eyre::Result<()>>>,
}

impl StartedServer {
    /// Waits until the server stops.
    ///
    /// # Errors
    ///
    /// Returns an error when the server fails or its task panics.
    pub async fn wait(mut self) -> eyre::Result<()> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| eyre::eyre!("server task already consumed"))?;
        handle.await.wrap_err("server task panicked")??;
        Ok(())
    }
}

impl Drop for StartedServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Binds `addr` and serves `state` in a background task.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn start_server(
    addr: SocketAddr,
    state: AppState,
    timeout: Duration,
) -> eyre::Result<StartedServer> {
    let app = router(state, timeout);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    let actual = listener
        .local_addr()
        .wrap_err("failed to read local addr")?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.wrap_err("server failed")?;
        Ok(())
    });
    tracing::info!(addr = %actual, "listening");

    Ok(StartedServer {
        addr: actual,
        handle: Some(handle),
    })
}
