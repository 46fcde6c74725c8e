use crate::error::{ApiError, ErrorResponse};
use crate::models::{ImageListResponse, ListImagesQuery};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::{Json, http::StatusCode};

/// GET /images handler - List a patient's images as URLs
///
/// Maps each stored path to an absolute URL built from the configured scheme
/// and the request's Host header, in storage order. A patient with no record
/// and a patient whose record has an empty path list both answer 404; the
/// two states are indistinguishable to clients.
#[utoipa::path(
    get,
    path = "/images",
    params(
        ("patientId" = String, Query, description = "Patient identifier")
    ),
    responses(
        (status = 200, description = "Image URLs in storage order", body = ImageListResponse),
        (status = 404, description = "No images for that patient", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "images"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListImagesQuery>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ImageListResponse>), ApiError> {
    let paths = state
        .service
        .list(&query.patient_id)
        .await?
        .ok_or_else(|| ApiError::NoImages(query.patient_id.clone()))?;

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!("{}:{}", state.config.service_host, state.config.service_port)
        });

    let image_urls = paths
        .iter()
        .map(|path| image_url(&state.config.public_scheme, &host, path))
        .collect();

    tracing::info!("Listed {} images for patient {}", paths.len(), query.patient_id);
    Ok((
        StatusCode::OK,
        Json(ImageListResponse {
            patient_id: query.patient_id,
            image_urls,
        }),
    ))
}

/// Join scheme, host, and a stored path into an absolute URL.
///
/// The path is used verbatim, with no re-encoding and no existence check.
fn image_url(scheme: &str, host: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}://{}{}", scheme, host, path)
    } else {
        format!("{}://{}/{}", scheme, host, path)
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
    use axum::{Router, body::Body, http::Request, routing::get};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> (Arc<MemoryRecordStore>, AppState) {
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
            service: ImageService::new(records.clone(), blobs),
            config: Arc::new(config),
        };
        (records, state)
    }

    fn test_app(state: AppState) -> Router {
        Router::new()
            .route(crate::routes::IMAGES, get(list_handler))
            .with_state(state)
    }

    #[test]
    fn test_image_url_joins_relative_path() {
        assert_eq!(
            image_url("http", "h", "uploads/a.png"),
            "http://h/uploads/a.png"
        );
    }

    #[test]
    fn test_image_url_joins_absolute_path_verbatim() {
        assert_eq!(image_url("http", "h", "/up/a.png"), "http://h/up/a.png");
    }

    #[tokio::test]
    async fn test_list_returns_urls_in_storage_order() {
        let (records, state) = test_state();
        records.insert(ImageRecord {
            id: uuid::Uuid::new_v4(),
            patient_id: "123".to_string(),
            image_paths: vec!["/up/a.png".to_string(), "/up/b.png".to_string()],
        });
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/images?patientId=123")
                    .header("host", "h")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            response_json,
            serde_json::json!({
                "patientId": "123",
                "imageUrls": ["http://h/up/a.png", "http://h/up/b.png"]
            })
        );
    }

    #[tokio::test]
    async fn test_list_unknown_patient_is_404() {
        let (_records, state) = test_state();
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/images?patientId=nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(error_response.error.contains("No images"));
    }

    #[tokio::test]
    async fn test_list_emptied_record_is_404() {
        let (records, state) = test_state();
        records.insert(ImageRecord {
            id: uuid::Uuid::new_v4(),
            patient_id: "123".to_string(),
            image_paths: vec![],
        });
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/images?patientId=123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_lookup_failure_is_500() {
        let (records, state) = test_state();
        records.set_fail_find(true);
        let app = test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/images?patientId=123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
