/// Errors raised by snapshot persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Required remote-store settings are missing.
    #[error("Storage is not configured: missing {missing}")]
    NotConfigured { missing: String },

    /// The HTTP request itself failed (network, DNS, timeout).
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Storage backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Stored content could not be decoded (bad encoding, directory, ...).
    #[error("Invalid stored content: {0}")]
    Decode(String),

    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Every write attempt was rejected with a revision conflict.
    #[error("Write conflict persisted after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },
}

impl StorageError {
    /// `true` for revision-mismatch rejections (HTTP 409 or 422).
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Status { status: 409 | 422, .. })
    }

    /// `true` for a missing resource (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Status { status: 404, .. })
    }
}
