//! Binary payload storage
//!
//! Each uploaded file lives at `<uploads>/<id><ext>`; metadata stays in the
//! catalog.

use std::path::PathBuf;
use tracing::{debug, warn};
use tunebox_common::{AudioFormat, Result};

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: i64, format: AudioFormat) -> PathBuf {
        self.dir.join(format!("{}{}", id, format.extension()))
    }

    /// Store the payload, creating the uploads directory on demand
    pub async fn write(&self, id: i64, format: AudioFormat, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(id, format);
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }

    /// Read the payload; `None` if it is missing or empty
    pub async fn read(&self, id: i64, format: AudioFormat) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(id, format);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => {
                warn!("File found but it is empty: {}", path.display());
                Ok(None)
            }
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the payload (no-op if missing)
    pub async fn remove(&self, id: i64, format: AudioFormat) -> Result<()> {
        let path = self.path_for(id, format);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
