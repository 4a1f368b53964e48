//! Implements DisplaySink by writing the result as `display.json` for the renderer.

use crate::domain::{DisplayResult, DomainError};
use crate::ports::DisplaySink;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct DisplayJsonFile {
    path: PathBuf,
}

impl DisplayJsonFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DisplaySink for DisplayJsonFile {
    /// Write-replace: temp file, sync_all, then rename over the target, so the
    /// renderer never sees a half-written document.
    async fn publish(&self, result: &DisplayResult) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| DomainError::Publish(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Publish(format!("create {}: {}", parent.display(), e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Publish(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Publish(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Publish(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Publish(format!("atomic rename failed: {}", e)))?;
        Ok(())
    }
}
