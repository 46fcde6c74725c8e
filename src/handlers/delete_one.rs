use crate::error::{ApiError, ErrorResponse};
use crate::models::{DeleteImageQuery, MessageResponse};
use crate::service::DeleteOutcome;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::{Json, http::StatusCode};

/// DELETE /images handler - Delete a single image for a patient
///
/// The path must match a stored entry exactly; only the first occurrence is
/// removed. A missing record and a non-member path both answer 404, so every
/// request yields exactly one response. The record update stands regardless
/// of the file-delete outcome.
#[utoipa::path(
    delete,
    path = "/images",
    params(
        ("patientId" = String, Query, description = "Patient identifier"),
        ("imagePath" = String, Query, description = "Stored path of the image to delete")
    ),
    responses(
        (status = 200, description = "Image deleted successfully", body = MessageResponse),
        (status = 404, description = "Image path not found for that patient", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "images"
)]
pub async fn delete_one_handler(
    State(state): State<AppState>,
    Query(query): Query<DeleteImageQuery>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    match state
        .service
        .delete_one(&query.patient_id, &query.image_path)
        .await?
    {
        DeleteOutcome::Deleted => {
            tracing::info!(
                "Deleted image {} for patient {}",
                query.image_path,
                query.patient_id
            );
            Ok((
                StatusCode::OK,
                Json(MessageResponse {
                    message: "Image deleted successfully".to_string(),
                }),
            ))
        }
        DeleteOutcome::NotFound => Err(ApiError::ImagePathNotFound(query.patient_id)),
    }
}
