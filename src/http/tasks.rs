//! `/tasks` routes. Every call names the acting identity as `ownerId`.

use super::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use crate::identity::domain::IdentityId;
use crate::task::{
    domain::{Task, TaskId},
    services::{CreateTaskRequest, UpdateTaskRequest},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskResponse {
    id: TaskId,
    owner_id: IdentityId,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            owner_id: task.owner_id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            completed: task.completed(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct OwnerQuery {
    owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateTaskBody {
    owner_id: Option<Uuid>,
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateTaskBody {
    owner_id: Option<Uuid>,
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct BulkDeleteBody {
    owner_id: Option<Uuid>,
    ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkDeleteResponse {
    deleted: u64,
}

fn require_owner(owner_id: Option<Uuid>) -> ApiResult<IdentityId> {
    owner_id
        .map(IdentityId::from_uuid)
        .ok_or_else(|| ApiError::validation("ownerId is required"))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    params: Result<Query<OwnerQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let Query(query) = params?;
    let owner = require_owner(query.owner_id)?;
    let tasks = state.tasks.list_for_owner(owner).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(body) = payload?;
    let owner = require_owner(body.owner_id)?;
    let mut request = CreateTaskRequest::new(owner, body.title.unwrap_or_default());
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    let task = state.tasks.create(request).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Path(raw_id) = path?;
    let Json(body) = payload?;
    let caller = require_owner(body.owner_id)?;

    let mut request = UpdateTaskRequest::new(caller, TaskId::from_uuid(raw_id));
    if let Some(title) = body.title {
        request = request.with_title(title);
    }
    // An empty string clears the description.
    if let Some(description) = body.description {
        request = request.with_description(Some(description));
    }
    if let Some(completed) = body.completed {
        request = request.with_completed(completed);
    }
    let task = state.tasks.update(request).await?;
    Ok(Json(task.into()))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<OwnerQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Path(raw_id) = path?;
    let Query(query) = params?;
    let caller = require_owner(query.owner_id)?;
    state
        .tasks
        .delete(caller, TaskId::from_uuid(raw_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn bulk_delete(
    State(state): State<AppState>,
    payload: Result<Json<BulkDeleteBody>, JsonRejection>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let Json(body) = payload?;
    let caller = require_owner(body.owner_id)?;
    let ids: Vec<TaskId> = body
        .ids
        .unwrap_or_default()
        .into_iter()
        .map(TaskId::from_uuid)
        .collect();
    let deleted = state.tasks.bulk_delete(caller, &ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
