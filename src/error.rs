use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    NoAuthenticatedUser,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Malformed entry: {0}")]
    MalformedEntry(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NoAuthenticatedUser => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::StoreUnavailable(e) => {
                tracing::error!(error = %e, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Journal storage is unavailable".into(),
                )
            }
            AppError::EntryNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MalformedEntry(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
