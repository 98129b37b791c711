//! Persistence seams.
//!
//! [`SnapshotStore`] is what the HTTP layer talks to. [`ContentsBackend`] is
//! the lower-level revisioned file API that [`DurableStore`] drives with its
//! conflict-retry loop.
//!
//! [`DurableStore`]: crate::durable::DurableStore

use async_trait::async_trait;
use storewatch_core::types::DashboardData;

use crate::error::StorageError;

/// Read/replace the single persisted snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Current snapshot, or `None` when nothing has been saved yet.
    async fn fetch(&self) -> Result<Option<DashboardData>, StorageError>;

    /// Replace the stored snapshot with `snapshot`.
    async fn save(&self, snapshot: &DashboardData) -> Result<(), StorageError>;
}

/// A file as stored remotely, with the revision token needed to replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub revision: String,
    /// Decoded UTF-8 content.
    pub content: String,
}

/// A single file in a versioned store with optimistic concurrency.
///
/// Writes must carry the revision of the content being replaced (`None`
/// when creating the file). A stale revision is rejected with a conflict
/// status, see [`StorageError::is_conflict`].
#[async_trait]
pub trait ContentsBackend: Send + Sync {
    /// Current file, or `None` if it does not exist.
    async fn read(&self) -> Result<Option<RemoteFile>, StorageError>;

    async fn write(&self, content: &str, revision: Option<&str>) -> Result<(), StorageError>;
}
