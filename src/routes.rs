// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const IMAGES: &str = "/images";
pub const IMAGES_BY_PATIENT: &str = "/images/{patient_id}";
