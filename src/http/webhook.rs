//! `/webhook`: phone-keyed task actions for the messaging gateway.
//!
//! The gateway names the contact by phone; the owner is resolved with
//! `ensure_for_phone`, so a first message creates the messaging guest.

use super::{
    error::{ApiError, ApiResult},
    state::AppState,
    tasks::TaskResponse,
};
use crate::identity::domain::{IdentityId, PhoneNumber};
use crate::task::{
    domain::{Task, TaskId},
    services::{CreateTaskRequest, UpdateTaskRequest},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newest tasks included in a `list` reply.
const LIST_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub(crate) enum WebhookCommand {
    Create {
        phone: String,
        title: Option<String>,
        description: Option<String>,
    },
    List {
        phone: String,
    },
    Complete {
        phone: String,
        task_id: Option<Uuid>,
    },
    Delete {
        phone: String,
        task_id: Option<Uuid>,
    },
}

impl WebhookCommand {
    fn phone(&self) -> &str {
        match self {
            Self::Create { phone, .. }
            | Self::List { phone }
            | Self::Complete { phone, .. }
            | Self::Delete { phone, .. } => phone,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WebhookResponse {
    identity_id: IdentityId,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<TaskResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<Vec<TaskResponse>>,
}

impl WebhookResponse {
    fn for_task(identity_id: IdentityId, message: String, task: Task) -> Self {
        Self {
            identity_id,
            message,
            task: Some(task.into()),
            total: None,
            pending: None,
            completed: None,
            tasks: None,
        }
    }
}

fn require_task_id(task_id: Option<Uuid>) -> ApiResult<TaskId> {
    task_id
        .map(TaskId::from_uuid)
        .ok_or_else(|| ApiError::validation("taskId is required"))
}

pub(crate) async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<WebhookCommand>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WebhookResponse>)> {
    let Json(command) = payload?;
    let phone =
        PhoneNumber::new(command.phone()).map_err(|err| ApiError::validation(err.to_string()))?;
    let (owner, _) = state.registry.ensure_for_phone(&phone).await?;
    let owner_id = owner.id();

    match command {
        WebhookCommand::Create {
            title, description, ..
        } => {
            let task_title = title.ok_or_else(|| ApiError::validation("title is required"))?;
            let mut request = CreateTaskRequest::new(owner_id, task_title);
            if let Some(text) = description {
                request = request.with_description(text);
            }
            let task = state.tasks.create(request).await?;
            let message = format!("Task created: \"{}\"", task.title().as_str());
            tracing::info!(
                identity_id = %owner_id,
                task_id = %task.id(),
                "task created over webhook"
            );
            Ok((
                StatusCode::CREATED,
                Json(WebhookResponse::for_task(owner_id, message, task)),
            ))
        }
        WebhookCommand::List { .. } => {
            let summary = state.tasks.summary_for_owner(owner_id, LIST_LIMIT).await?;
            let message = format!(
                "You have {} pending and {} completed tasks.",
                summary.pending, summary.completed
            );
            Ok((
                StatusCode::OK,
                Json(WebhookResponse {
                    identity_id: owner_id,
                    message,
                    task: None,
                    total: Some(summary.total()),
                    pending: Some(summary.pending),
                    completed: Some(summary.completed),
                    tasks: Some(summary.recent.into_iter().map(TaskResponse::from).collect()),
                }),
            ))
        }
        WebhookCommand::Complete { task_id, .. } => {
            let request =
                UpdateTaskRequest::new(owner_id, require_task_id(task_id)?).with_completed(true);
            let task = state.tasks.update(request).await?;
            let message = format!("Task completed: \"{}\"", task.title().as_str());
            Ok((
                StatusCode::OK,
                Json(WebhookResponse::for_task(owner_id, message, task)),
            ))
        }
        WebhookCommand::Delete { task_id, .. } => {
            let task = state
                .tasks
                .delete(owner_id, require_task_id(task_id)?)
                .await?;
            let message = format!("Task deleted: \"{}\"", task.title().as_str());
            Ok((
                StatusCode::OK,
                Json(WebhookResponse::for_task(owner_id, message, task)),
            ))
        }
    }
}
