use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::StorageError;

/// Failure of a whole scan pass
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Persisting a discovered asset failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The pass task panicked or was cancelled
    #[error("Scan task aborted: {0}")]
    Aborted(String),
}

/// Unified API error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

/// API error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<crate::models::UnknownAssetClass> for AppError {
    fn from(e: crate::models::UnknownAssetClass) -> Self {
        AppError::BadRequest(e.to_string())
    }
}
