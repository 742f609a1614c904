use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use talenthunt_common::LifecycleError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_STATUS`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`,
    /// `NOT_TEAM_MEMBER`, `NOT_FOUND`, `NOT_APPROVED`, `DEADLINE_PASSED`,
    /// `CAPACITY_EXCEEDED`, `ALREADY_MEMBER`, `ALREADY_REGISTERED`, `NOT_REGISTERED`,
    /// `LEADER_CANNOT_LEAVE`, `EMAIL_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "CAPACITY_EXCEEDED")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Team is full (4 maximum)")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    /// Authenticated, but not allowed to touch this resource.
    PermissionDenied(String),
    NotFound(String),
    EmailTaken,
    /// A business rule refused the operation.
    Lifecycle(LifecycleError),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid email or password".into(),
                },
            ),
            AppError::PermissionDenied(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EMAIL_TAKEN",
                    message: "Email is already registered".into(),
                },
            ),
            AppError::Lifecycle(err) => (
                lifecycle_status(&err),
                ErrorBody {
                    code: err.code(),
                    message: err.to_string(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

fn lifecycle_status(err: &LifecycleError) -> StatusCode {
    match err {
        LifecycleError::RoleViolation(_) | LifecycleError::NotTeamMember => StatusCode::FORBIDDEN,
        LifecycleError::InvalidStatus(_) | LifecycleError::InvalidPayload(_) => {
            StatusCode::BAD_REQUEST
        }
        LifecycleError::NotRegistered => StatusCode::NOT_FOUND,
        LifecycleError::NotApproved(_)
        | LifecycleError::DeadlinePassed
        | LifecycleError::CapacityExceeded(_)
        | LifecycleError::AlreadyMember
        | LifecycleError::AlreadyRegistered
        | LifecycleError::LeaderCannotLeave => StatusCode::CONFLICT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        tracing::warn!(code = err.code(), "Rejected: {err}");
        AppError::Lifecycle(err)
    }
}
