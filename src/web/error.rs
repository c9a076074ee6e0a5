// Error types for the web layer and their conversion into HTTP responses.

use crate::{record_store::StoreError, upload_validator::UploadError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Web layer error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(String),

    // Application-specific errors
    Upload(UploadError),
    Storage(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),

            // Validation failures are the client's; a failed move into the
            // upload directory is ours.
            Self::Upload(err) if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Upload(err) => {
                tracing::error!("Upload could not be stored: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Storage(err) => {
                tracing::error!("Record store write failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The image could not be saved. Please try again later.".to_string(),
                )
            }
        };

        (status, error_message).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(error: UploadError) -> Self {
        Self::Upload(error)
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::Storage(error)
    }
}
