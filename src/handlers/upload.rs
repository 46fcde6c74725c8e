use crate::error::{ApiError, ErrorResponse};
use crate::models::MessageResponse;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::{Json, http::StatusCode};

/// POST /images handler - Upload an image for a patient
///
/// Expects a multipart form with a `patientId` text field and an `image`
/// file field. The file is written to the blob store first; the stored path
/// is then appended to the patient's record, creating the record on first
/// upload. If the record save fails the staged file is cleaned up and the
/// caller gets a 500.
#[utoipa::path(
    post,
    path = "/images",
    responses(
        (status = 200, description = "Image saved successfully", body = MessageResponse),
        (status = 400, description = "Missing or malformed multipart field", body = ErrorResponse),
        (status = 500, description = "Failed to persist the image record", body = ErrorResponse)
    ),
    tag = "images"
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let mut patient_id: Option<String> = None;
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidMultipart(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("patientId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidMultipart(e.to_string()))?;
                patient_id = Some(value);
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidMultipart(e.to_string()))?;
                image = Some((file_name, data));
            }
            _ => {}
        }
    }

    let patient_id = patient_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("patientId"))?;
    let (file_name, data) = image.ok_or(ApiError::MissingField("image"))?;

    // Upstream step: the file must be durably on disk before the record
    // update runs.
    let file_path = state
        .service
        .stage_upload(&file_name, &data)
        .await
        .map_err(ApiError::BlobWrite)?;

    state.service.append(&patient_id, &file_path).await?;

    tracing::info!("Saved image {} for patient {}", file_path, patient_id);
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Image saved successfully".to_string(),
        }),
    ))
}
