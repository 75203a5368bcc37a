//! JSON error responses.

use crate::identity::{ports::IdentityRepositoryError, services::IdentityRegistryError};
use crate::link::services::LinkError;
use crate::session::services::SessionServiceError;
use crate::task::{ports::TaskRepositoryError, services::TaskServiceError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error rendered as `{ "error": <code>, "message": <text> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Missing or malformed input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// Missing or mismatched shared secret.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "missing or invalid secret")
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    fn storage(err: &dyn std::error::Error) -> Self {
        tracing::error!(error = %err, "storage failure");
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "storage_error",
            "storage temporarily unavailable, retry the request",
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Validation(domain) => Self::validation(domain.to_string()),
            LinkError::InvalidCode => {
                Self::new(StatusCode::NOT_FOUND, "invalid_code", err.to_string())
            }
            LinkError::AlreadyLinked { .. } => {
                Self::new(StatusCode::CONFLICT, "already_linked", err.to_string())
            }
            LinkError::CodeBoundToOtherPhone => Self::new(
                StatusCode::CONFLICT,
                "code_bound_to_other_phone",
                err.to_string(),
            ),
            LinkError::Storage(_) => Self::storage(&err),
        }
    }
}

impl From<IdentityRegistryError> for ApiError {
    fn from(err: IdentityRegistryError) -> Self {
        match err {
            IdentityRegistryError::Domain(domain) => Self::validation(domain.to_string()),
            IdentityRegistryError::Repository(IdentityRepositoryError::NotFound(_)) => {
                Self::not_found(err.to_string())
            }
            IdentityRegistryError::Repository(IdentityRepositoryError::Persistence(_))
            | IdentityRegistryError::Ownership(_)
            | IdentityRegistryError::LinkCodeSpaceExhausted { .. } => Self::storage(&err),
            IdentityRegistryError::Repository(_) | IdentityRegistryError::StillOwnsTasks { .. } => {
                Self::conflict(err.to_string())
            }
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Domain(domain) => Self::validation(domain.to_string()),
            TaskServiceError::NothingToUpdate | TaskServiceError::EmptySelection => {
                Self::validation(err.to_string())
            }
            TaskServiceError::UnknownOwner(_)
            | TaskServiceError::NotFound(_)
            | TaskServiceError::Repository(
                TaskRepositoryError::NotFound(_) | TaskRepositoryError::UnknownOwner(_),
            ) => {
                Self::not_found(err.to_string())
            }
            TaskServiceError::NotOwner { .. } => {
                Self::new(StatusCode::FORBIDDEN, "not_owner", err.to_string())
            }
            TaskServiceError::Repository(TaskRepositoryError::DuplicateTask(_)) => {
                Self::conflict(err.to_string())
            }
            TaskServiceError::Repository(TaskRepositoryError::Persistence(_))
            | TaskServiceError::Identity(_) => Self::storage(&err),
        }
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(err: SessionServiceError) -> Self {
        match err {
            SessionServiceError::Validation(domain) => Self::validation(domain.to_string()),
            SessionServiceError::Repository(_) => Self::storage(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
