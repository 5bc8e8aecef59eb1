use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finboard_import::ImportError;
use finboard_storage::StorageError;
use serde_json::json;

use crate::ingest::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upload was read but its contents could not be imported.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedSource(_) => ApiError::BadRequest(err.to_string()),
            e if e.is_malformed_input() => ApiError::Unprocessable(e.to_string()),
            e => ApiError::Unexpected(e.into()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Unexpected(err.into())
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Import(e) => e.into(),
            IngestError::Storage(e) => e.into(),
            e => ApiError::Unexpected(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unexpected(err) => {
                tracing::error!(error = %format!("{err:#}"), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(%msg, "bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Unprocessable(msg) => {
                tracing::warn!(%msg, "rejected upload");
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
