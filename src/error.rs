use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use crate::domain::models::user::Role;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invite has expired")]
    Expired,
    #[error("Invite has already been accepted")]
    AlreadyAccepted,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Insufficient permissions (required: {required:?}, current: {current})")]
    InsufficientRole { required: Vec<Role>, current: Role },
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// True when the storage layer rejected a write on a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => e
                .as_database_error()
                .map(|db_err| db_err.is_unique_violation())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn conflict_on_unique(self, msg: &str) -> AppError {
        if self.is_unique_violation() {
            AppError::Conflict(msg.to_string())
        } else {
            self
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) if self.is_unique_violation() => "CONFLICT",
            AppError::Database(_) => "INTERNAL",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Expired => "EXPIRED",
            AppError::AlreadyAccepted => "ALREADY_ACCEPTED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) | AppError::InsufficientRole { .. } => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal | AppError::InternalWithMsg(_) => "INTERNAL",
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if self.is_unique_violation() {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": code }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Expired => (StatusCode::BAD_REQUEST, "Invite has expired".to_string()),
            AppError::AlreadyAccepted => (StatusCode::BAD_REQUEST, "Invite has already been accepted".to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::InsufficientRole { required, current } => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({
                        "error": "Insufficient permissions",
                        "code": code,
                        "required": required,
                        "current": current,
                    }))
                ).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
