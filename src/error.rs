//! Error taxonomy shared by the stores and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("text cannot be stored safely: {0}")]
    Encoding(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::EmptyCart => StatusCode::BAD_REQUEST,
            StoreError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            StoreError::Storage(e) => {
                tracing::error!(error = %e, "file storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
            _ => self.to_string(),
        };
        (status, Json(serde_json::json!({ "error": body }))).into_response()
    }
}
