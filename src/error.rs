//! Error types for the Elidune admin console routes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::{ApiError, ErrorKind};

/// Route-level error. Actions never produce one: they answer with an
/// action result instead. Views, exports and the session routes do.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated { redirect: String },

    #[error("Access denied: {reason}")]
    Forbidden { redirect: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Unauthenticated { redirect } | AppError::Forbidden { redirect, .. } => {
                return Redirect::to(redirect).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad-request".to_string(), msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not-found".to_string(), msg.clone()),
            AppError::Backend(e) => {
                let kind = e.kind();
                let status = match kind {
                    ErrorKind::AuthorizationFailure => e.status().unwrap_or(StatusCode::UNAUTHORIZED),
                    ErrorKind::ValidationFailure => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::NetworkFailure => StatusCode::BAD_GATEWAY,
                    ErrorKind::PartialFailure | ErrorKind::UnknownFailure => match e.status() {
                        Some(StatusCode::NOT_FOUND) => StatusCode::NOT_FOUND,
                        _ => StatusCode::BAD_GATEWAY,
                    },
                };
                if status.is_server_error() {
                    tracing::error!("Backend error: {}", e);
                }
                (status, kind.to_string(), e.user_message())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal".to_string(),
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error,
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for route operations
pub type AppResult<T> = Result<T, AppError>;
