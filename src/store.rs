use async_trait::async_trait;
use uuid::Uuid;

/// One document per patient: the ordered list of stored image file paths.
///
/// The record is created on the first upload for a patient and never deleted
/// afterwards; delete-all only empties the path list. Duplicate paths are
/// permitted and insertion order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Assigned once at creation, immutable afterwards.
    pub id: Uuid,
    /// Natural key; at most one record exists per patient.
    pub patient_id: String,
    pub image_paths: Vec<String>,
}

impl ImageRecord {
    pub fn new(patient_id: &str, first_path: &str) -> Self {
        ImageRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            image_paths: vec![first_path.to_string()],
        }
    }
}

/// Record-store failure, tagged by the operation that failed.
///
/// The distinction matters to the upload path: a failed save triggers cleanup
/// of the just-written file, a failed lookup must not.
#[derive(Debug)]
pub enum StoreError {
    Lookup(anyhow::Error),
    Save(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Lookup(err) => write!(f, "record lookup failed: {}", err),
            StoreError::Save(err) => write!(f, "record save failed: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

/// Document collection keyed by patient identifier.
///
/// `find` returning `Ok(None)` is the normal "no record yet" outcome, not an
/// error. `save` is an upsert: insert on first append, update afterwards.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, patient_id: &str) -> Result<Option<ImageRecord>, StoreError>;

    async fn save(&self, record: &ImageRecord) -> Result<(), StoreError>;

    /// Lightweight connectivity probe for the health endpoint.
    async fn health_check(&self) -> anyhow::Result<()>;
}
