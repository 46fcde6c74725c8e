use crate::blob::BlobStore;
use crate::store::{ImageRecord, RecordStore, StoreError};
use std::sync::Arc;

/// Outcome of a delete operation; not-found is a value, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The image-record lifecycle core.
///
/// Mediates between the record store (one document per patient) and the blob
/// store (uploaded file bytes on disk). All blob deletions are best-effort:
/// failures are logged and never change the outcome of the enclosing
/// operation, so an orphaned file or a dangling path is an accepted state.
#[derive(Clone)]
pub struct ImageService {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ImageService {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        ImageService { records, blobs }
    }

    /// Write uploaded bytes to the blob store, returning the stored path.
    ///
    /// This is the upstream step of an upload: the file must be durably on
    /// disk before `append` links it to the patient's record.
    pub async fn stage_upload(&self, file_name: &str, data: &[u8]) -> anyhow::Result<String> {
        self.blobs.store(file_name, data).await
    }

    /// Append a stored file path to the patient's record, creating the record
    /// on first upload.
    ///
    /// A failed save removes the just-staged file so no orphaned upload is
    /// left behind; a failed lookup does not, since the record was never at
    /// risk of missing the path.
    pub async fn append(&self, patient_id: &str, file_path: &str) -> Result<(), StoreError> {
        let record = match self.records.find(patient_id).await? {
            Some(mut record) => {
                record.image_paths.push(file_path.to_string());
                record
            }
            None => ImageRecord::new(patient_id, file_path),
        };

        if let Err(err) = self.records.save(&record).await {
            tracing::error!("Failed to save image record for patient {}: {}", patient_id, err);
            if let Err(remove_err) = self.blobs.remove(file_path).await {
                tracing::warn!("Failed to remove orphaned upload {}: {}", file_path, remove_err);
            }
            return Err(err);
        }

        tracing::debug!(
            "Appended {} for patient {} ({} paths total)",
            file_path,
            patient_id,
            record.image_paths.len()
        );
        Ok(())
    }

    /// The patient's stored paths in insertion order, or `None` when the
    /// record is absent or its path list is empty. The two states are
    /// indistinguishable to callers.
    pub async fn list(&self, patient_id: &str) -> Result<Option<Vec<String>>, StoreError> {
        match self.records.find(patient_id).await? {
            Some(record) if !record.image_paths.is_empty() => Ok(Some(record.image_paths)),
            _ => Ok(None),
        }
    }

    /// Delete every image for the patient: best-effort blob deletes for each
    /// path, then the path list is emptied and the record saved. The record
    /// itself survives with zero paths.
    pub async fn delete_all(&self, patient_id: &str) -> Result<DeleteOutcome, StoreError> {
        let Some(mut record) = self.records.find(patient_id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };
        if record.image_paths.is_empty() {
            return Ok(DeleteOutcome::NotFound);
        }

        for path in &record.image_paths {
            if let Err(err) = self.blobs.remove(path).await {
                tracing::warn!("Failed to delete image file {}: {}", path, err);
            }
        }

        record.image_paths.clear();
        self.records.save(&record).await?;

        tracing::debug!("Deleted all images for patient {}", patient_id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Remove a single path (first occurrence, exact string match) from the
    /// patient's record, then best-effort delete the underlying file. The
    /// record update stands regardless of the file-delete outcome.
    pub async fn delete_one(
        &self,
        patient_id: &str,
        image_path: &str,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(mut record) = self.records.find(patient_id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };

        let Some(pos) = record.image_paths.iter().position(|p| p == image_path) else {
            return Ok(DeleteOutcome::NotFound);
        };
        record.image_paths.remove(pos);

        self.records.save(&record).await?;

        if let Err(err) = self.blobs.remove(image_path).await {
            tracing::warn!("Failed to delete image file {}: {}", image_path, err);
        }

        tracing::debug!("Deleted {} for patient {}", image_path, patient_id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Record-store connectivity probe for the health endpoint.
    pub async fn health(&self) -> anyhow::Result<()> {
        self.records.health_check().await
    }
}
