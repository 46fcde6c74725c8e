use crate::config::Config;
use crate::service::ImageService;
use std::sync::Arc;

/// Shared application state
///
/// The service is constructed with explicit store handles so tests can
/// substitute in-memory fakes for Spanner and the filesystem.
#[derive(Clone)]
pub struct AppState {
    pub service: ImageService,
    pub config: Arc<Config>,
}
