use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use staybook_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ForbiddenError(String),
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ForbiddenError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Business-rule failures are all 403; ineligible tickets fold into the same answer.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => AppError::NotFoundError(format!("Not found: {}", msg)),
            CoreError::Conflict(msg) => AppError::ForbiddenError(msg),
            CoreError::Ineligible(_) => {
                AppError::ForbiddenError("ticket does not allow a hotel booking".to_string())
            }
            CoreError::Storage(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}
