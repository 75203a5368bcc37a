//! `/sessions` routes, guarded by the shared secret.
//!
//! Reads and deactivation answer with a JSON array holding zero or one
//! session.

use super::{error::ApiResult, link::PhoneQuery, state::AppState};
use crate::session::domain::ConversationSession;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    phone: String,
    active: bool,
    context: Value,
    last_interaction_at: DateTime<Utc>,
}

impl From<ConversationSession> for SessionResponse {
    fn from(session: ConversationSession) -> Self {
        Self {
            phone: session.phone().as_str().to_owned(),
            active: session.is_active(),
            context: session.context().clone(),
            last_interaction_at: session.last_interaction_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ActivateBody {
    phone: Option<String>,
    context: Option<Value>,
}

fn as_list(session: Option<ConversationSession>) -> Json<Vec<SessionResponse>> {
    Json(session.into_iter().map(SessionResponse::from).collect())
}

pub(crate) async fn get_active(
    State(state): State<AppState>,
    params: Result<Query<PhoneQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let Query(query) = params?;
    let session = state
        .sessions
        .get(query.phone.as_deref().unwrap_or_default())
        .await?;
    Ok(as_list(session))
}

pub(crate) async fn activate(
    State(state): State<AppState>,
    payload: Result<Json<ActivateBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let Json(body) = payload?;
    let session = state
        .sessions
        .activate(body.phone.as_deref().unwrap_or_default(), body.context)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub(crate) async fn deactivate(
    State(state): State<AppState>,
    params: Result<Query<PhoneQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let Query(query) = params?;
    let session = state
        .sessions
        .deactivate(query.phone.as_deref().unwrap_or_default())
        .await?;
    Ok(as_list(session))
}
