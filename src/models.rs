use serde::{Deserialize, Serialize};

/// Confirmation response for upload and delete operations
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Response type for the image list endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageListResponse {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    /// Absolute URLs in storage order
    #[serde(rename = "imageUrls")]
    pub image_urls: Vec<String>,
}

/// Query parameters for the image list endpoint
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ListImagesQuery {
    #[serde(rename = "patientId")]
    pub patient_id: String,
}

/// Query parameters for the single-image delete endpoint
#[derive(Deserialize, utoipa::ToSchema)]
pub struct DeleteImageQuery {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
}
