//! Snapshot stored as a plain JSON file on local disk, for development.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storewatch_core::types::DashboardData;

use crate::error::StorageError;
use crate::store::SnapshotStore;

pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for LocalFileStore {
    async fn fetch(&self) -> Result<Option<DashboardData>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it over the target so a
    /// reader never sees a half-written snapshot.
    async fn save(&self, snapshot: &DashboardData) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::info!(path = %self.path.display(), "Snapshot saved to local file");
        Ok(())
    }
}
