use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

/// File-backed blob storage for uploaded image bytes.
///
/// Paths returned by `store` are opaque to callers; they are persisted in the
/// image record verbatim and handed back to `remove` on deletion.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write uploaded bytes and return the path they were stored under.
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<String>;

    /// Delete the file at a previously returned path.
    async fn remove(&self, path: &str) -> Result<()>;
}

/// Local-disk blob store rooted at the configured upload directory.
///
/// Each upload gets a fresh UUID prefix so repeated uploads of the same file
/// name never collide.
pub struct FsBlobStore {
    upload_dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        FsBlobStore {
            upload_dir: upload_dir.into(),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create upload directory {}",
                    self.upload_dir.display()
                )
            })?;

        // Strip any path separators smuggled in via the client file name.
        let safe_name = file_name.replace(['/', '\\'], "_");
        let path = self
            .upload_dir
            .join(format!("{}_{}", Uuid::new_v4(), safe_name));

        fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write upload to {}", path.display()))?;

        tracing::debug!("Stored upload at {} ({} bytes)", path.display(), data.len());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to remove file {}", path))?;
        tracing::debug!("Removed file {}", path);
        Ok(())
    }
}
