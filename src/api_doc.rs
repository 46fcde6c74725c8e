use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{ImageListResponse, MessageResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "patient-image-api",
        version = "1.0.0",
        description = "Associates uploaded image files with patient identifiers"
    ),
    paths(
        handlers::health::health_handler,
        handlers::upload::upload_handler,
        handlers::list::list_handler,
        handlers::delete_all::delete_all_handler,
        handlers::delete_one::delete_one_handler
    ),
    components(
        schemas(
            MessageResponse,
            ImageListResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "images", description = "Patient image operations")
    )
)]
pub struct ApiDoc;
