use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Maps each failure to an HTTP status and a JSON body. Not-found outcomes
/// are expected results of the image operations, not faults; the record
/// store is the only source of 5xx responses.
#[derive(Debug)]
pub enum ApiError {
    /// Required multipart field missing from the upload request
    MissingField(&'static str),
    /// Upload body could not be parsed as multipart form data
    InvalidMultipart(String),
    /// No record, or record with an empty path list, for the patient
    NoImages(String),
    /// The given path is not a member of the patient's record
    ImagePathNotFound(String),
    /// Uploaded file could not be written to the blob store
    BlobWrite(anyhow::Error),
    /// Record store read/write error
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {}", field),
            ),
            ApiError::InvalidMultipart(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid multipart upload: {}", msg),
            ),
            ApiError::NoImages(patient_id) => (
                StatusCode::NOT_FOUND,
                format!("No images found for patient {}", patient_id),
            ),
            ApiError::ImagePathNotFound(patient_id) => (
                StatusCode::NOT_FOUND,
                format!("Image path was not found for patient {}", patient_id),
            ),
            ApiError::BlobWrite(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to store uploaded file: {}", err),
            ),
            ApiError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", err),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
