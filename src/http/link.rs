//! `/link` routes.

use super::{error::ApiResult, state::AppState};
use crate::identity::domain::IdentityId;
use crate::link::{
    domain::{LinkAction, LinkOutcome, LinkStatus},
    services::LinkRequest,
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct LinkBody {
    phone: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkResponse {
    identity_id: IdentityId,
    phone: Option<String>,
    action: LinkAction,
    migrated_tasks: u64,
}

impl From<LinkOutcome> for LinkResponse {
    fn from(outcome: LinkOutcome) -> Self {
        Self {
            identity_id: outcome.identity.id(),
            phone: outcome.identity.phone().map(|phone| phone.as_str().to_owned()),
            action: outcome.action,
            migrated_tasks: outcome.migrated_tasks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PhoneQuery {
    pub(crate) phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkStatusResponse {
    linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity_id: Option<IdentityId>,
    phone: String,
}

impl From<LinkStatus> for LinkStatusResponse {
    fn from(status: LinkStatus) -> Self {
        Self {
            linked: status.linked(),
            identity_id: status.identity_id,
            phone: status.phone.as_str().to_owned(),
        }
    }
}

pub(crate) async fn redeem(
    State(state): State<AppState>,
    payload: Result<Json<LinkBody>, JsonRejection>,
) -> ApiResult<Json<LinkResponse>> {
    let Json(body) = payload?;
    let request = LinkRequest::new(body.phone.unwrap_or_default(), body.code.unwrap_or_default());
    let outcome = state.link.link(request).await?;
    Ok(Json(outcome.into()))
}

pub(crate) async fn status(
    State(state): State<AppState>,
    params: Result<Query<PhoneQuery>, QueryRejection>,
) -> ApiResult<Json<LinkStatusResponse>> {
    let Query(query) = params?;
    let link_status = state
        .link
        .link_status(query.phone.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(link_status.into()))
}
