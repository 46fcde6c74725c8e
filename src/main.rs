mod api_doc;
mod blob;
mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod service;
mod spanner;
mod state;
mod store;

use api_doc::ApiDoc;
use axum::Router;
use axum::routing::{delete, get, post};
use blob::FsBlobStore;
use config::Config;
use service::ImageService;
use spanner::SpannerRecordStore;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("patient-image-api starting");

    let config = Config::from_env()?;
    config.log_startup();

    let records = SpannerRecordStore::from_config(&config).await?;
    let blobs = FsBlobStore::new(&config.upload_dir);

    let state = AppState {
        service: ImageService::new(Arc::new(records), Arc::new(blobs)),
        config: Arc::new(config.clone()),
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(routes::HEALTH, get(handlers::health_handler))
        .route(
            routes::IMAGES,
            post(handlers::upload_handler)
                .get(handlers::list_handler)
                .delete(handlers::delete_one_handler),
        )
        .route(routes::IMAGES_BY_PATIENT, delete(handlers::delete_all_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.service_host, config.service_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
