//! Shared-secret guard for internal endpoints.

use super::{error::ApiError, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-tasklink-secret";

pub(crate) async fn require_secret(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if state.secret.verify(presented) {
        return next.run(req).await;
    }
    tracing::warn!(path = %req.uri().path(), "rejected request with missing or invalid secret");
    ApiError::unauthorized().into_response()
}
