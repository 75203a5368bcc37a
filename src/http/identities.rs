//! `/identities` routes.

use super::{
    error::{ApiError, ApiResult},
    link::PhoneQuery,
    state::AppState,
};
use crate::identity::domain::{Identity, IdentityId, IdentityKind, OriginChannel, PhoneNumber};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdentityResponse {
    id: IdentityId,
    kind: IdentityKind,
    phone: Option<String>,
    link_code: Option<String>,
    created_via: OriginChannel,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id(),
            kind: identity.kind(),
            phone: identity.phone().map(|phone| phone.as_str().to_owned()),
            link_code: identity.link_code().map(|code| code.as_str().to_owned()),
            created_via: identity.created_via(),
            created_at: identity.created_at(),
            updated_at: identity.updated_at(),
        }
    }
}

pub(crate) async fn create_guest(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<IdentityResponse>)> {
    let identity = state.registry.create_guest(OriginChannel::Web).await?;
    Ok((StatusCode::CREATED, Json(identity.into())))
}

pub(crate) async fn ensure_messaging(
    State(state): State<AppState>,
    payload: Result<Json<PhoneQuery>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdentityResponse>)> {
    let Json(body) = payload?;
    let phone = PhoneNumber::new(body.phone.unwrap_or_default())
        .map_err(|err| ApiError::validation(err.to_string()))?;
    let (identity, created) = state.registry.ensure_for_phone(&phone).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(identity.into())))
}

pub(crate) async fn get_identity(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<IdentityResponse>> {
    let Path(raw) = path?;
    let id = IdentityId::from_uuid(raw);
    state
        .registry
        .find_by_id(id)
        .await?
        .map(|identity| Json(identity.into()))
        .ok_or_else(|| ApiError::not_found(format!("identity not found: {id}")))
}
