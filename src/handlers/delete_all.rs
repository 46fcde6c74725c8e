use crate::error::{ApiError, ErrorResponse};
use crate::models::MessageResponse;
use crate::service::DeleteOutcome;
use crate::routes;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};

/// DELETE /images/{patient_id} handler - Delete all of a patient's images
///
/// Issues a best-effort file delete for every stored path, then empties the
/// record's path list. Individual file-delete failures are logged and never
/// change the outcome. The record itself survives with zero paths.
#[utoipa::path(
    delete,
    path = routes::IMAGES_BY_PATIENT,
    params(
        ("patient_id" = String, Path, description = "Patient identifier")
    ),
    responses(
        (status = 200, description = "All images deleted", body = MessageResponse),
        (status = 404, description = "No images for that patient", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "images"
)]
pub async fn delete_all_handler(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    match state.service.delete_all(&patient_id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!("Deleted all images for patient {}", patient_id);
            Ok((
                StatusCode::OK,
                Json(MessageResponse {
                    message: format!("All images deleted for patient {}", patient_id),
                }),
            ))
        }
        DeleteOutcome::NotFound => Err(ApiError::NoImages(patient_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::memory::MemoryBlobStore;
    use crate::config::Config;
    use crate::service::ImageService;
    use crate::store::ImageRecord;
    use crate::store::memory::MemoryRecordStore;
    use axum::{Router, body::Body, http::Request, routing::delete};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> (Arc<MemoryRecordStore>, Arc<MemoryBlobStore>, AppState) {
        let records = Arc::new(MemoryRecordStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let config = Config {
            spanner_emulator_host: None,
            spanner_project: "test-project".to_string(),
            spanner_instance: "test-instance".to_string(),
            spanner_database: "test-database".to_string(),
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
            upload_dir: "uploads".into(),
            public_scheme: "http".to_string(),
        };
        let state = AppState {
            service: ImageService::new(records.clone(), blobs.clone()),
            config: Arc::new(config),
        };
        (records, blobs, state)
    }

    fn test_app(state: AppState) -> Router {
        Router::new()
            .route(crate::routes::IMAGES_BY_PATIENT, delete(delete_all_handler))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_delete_all_empties_record_and_removes_files() {
        let (records, blobs, state) = test_state();
        records.insert(ImageRecord {
            id: uuid::Uuid::new_v4(),
            patient_id: "123".to_string(),
            image_paths: vec!["/up/a.png".to_string(), "/up/b.png".to_string()],
        });
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/images/123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(records.get("123").unwrap().image_paths.is_empty());
        assert_eq!(
            blobs.removed(),
            vec!["/up/a.png".to_string(), "/up/b.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_all_unknown_patient_is_404() {
        let (_records, _blobs, state) = test_state();
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/images/nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_all_succeeds_when_file_deletes_fail() {
        let (records, blobs, state) = test_state();
        records.insert(ImageRecord {
            id: uuid::Uuid::new_v4(),
            patient_id: "123".to_string(),
            image_paths: vec!["/up/a.png".to_string()],
        });
        blobs.set_fail_remove(true);
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/images/123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(records.get("123").unwrap().image_paths.is_empty());
    }
}
