//! Snapshot persistence over a revisioned backend.
//!
//! The backend does not lock: two writers can both read revision `r1` and
//! race to replace it. The loser gets a conflict status. [`DurableStore::save`]
//! treats that as contention, waits a jittered delay so competing writers
//! drift apart, re-reads the revision and tries again, up to
//! [`RetryPolicy::max_attempts`] writes in total.
//!
//! ```text
//! ReadRevision ─▶ Write ─┬─▶ Done
//!      ▲                 ├─▶ ConflictRetry ──(attempts left)──┐
//!      └─────────────────┼────────────────────────────────────┘
//!                        └─▶ Fatal (non-conflict error or budget spent)
//! ```

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use storewatch_core::types::DashboardData;

use crate::error::StorageError;
use crate::store::{ContentsBackend, SnapshotStore};

/// Write attempts before a persistent conflict becomes fatal.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Jitter window between conflicting attempts, in milliseconds.
pub const DEFAULT_BACKOFF_MS: RangeInclusive<u64> = 500..=1500;

/// Bounded retry configuration for conflicting writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total write attempts, including the first.
    pub max_attempts: u32,
    /// Each retry sleeps for a uniformly random delay in this window.
    pub backoff_ms: RangeInclusive<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// No delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_ms: 0..=0,
        }
    }

    fn jittered_delay(&self) -> Duration {
        let (lo, hi) = (*self.backoff_ms.start(), *self.backoff_ms.end());
        if hi <= lo {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

/// State of one `save` call.
#[derive(Debug)]
enum SaveState {
    ReadRevision { attempt: u32 },
    Write { attempt: u32, revision: Option<String> },
    ConflictRetry { attempt: u32 },
    Done,
    Fatal(StorageError),
}

/// [`SnapshotStore`] over any [`ContentsBackend`], with conflict retry.
pub struct DurableStore<B> {
    backend: B,
    policy: RetryPolicy,
}

impl<B: ContentsBackend> DurableStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_policy(backend, RetryPolicy::default())
    }

    pub fn with_policy(backend: B, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn step(&self, state: SaveState, body: &str) -> SaveState {
        match state {
            SaveState::ReadRevision { attempt } => match self.backend.read().await {
                Ok(file) => SaveState::Write {
                    attempt,
                    revision: file.map(|f| f.revision),
                },
                Err(err) => SaveState::Fatal(err),
            },

            SaveState::Write { attempt, revision } => {
                match self.backend.write(body, revision.as_deref()).await {
                    Ok(()) => {
                        tracing::info!(attempt, "Snapshot saved");
                        SaveState::Done
                    }
                    Err(err) if err.is_conflict() => {
                        tracing::warn!(
                            attempt,
                            max_attempts = self.policy.max_attempts,
                            error = %err,
                            "Snapshot write conflict (stale revision)"
                        );
                        SaveState::ConflictRetry { attempt }
                    }
                    Err(err) => SaveState::Fatal(err),
                }
            }

            SaveState::ConflictRetry { attempt } => {
                if attempt >= self.policy.max_attempts {
                    tracing::error!(attempts = attempt, "Snapshot write retries exhausted");
                    return SaveState::Fatal(StorageError::ConflictExhausted { attempts: attempt });
                }
                let delay = self.policy.jittered_delay();
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(delay).await;
                SaveState::ReadRevision {
                    attempt: attempt + 1,
                }
            }

            terminal @ (SaveState::Done | SaveState::Fatal(_)) => terminal,
        }
    }
}

#[async_trait]
impl<B: ContentsBackend> SnapshotStore for DurableStore<B> {
    async fn fetch(&self) -> Result<Option<DashboardData>, StorageError> {
        let Some(file) = self.backend.read().await? else {
            tracing::debug!("No snapshot stored yet");
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&file.content)?))
    }

    async fn save(&self, snapshot: &DashboardData) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(snapshot)?;

        let mut state = SaveState::ReadRevision { attempt: 1 };
        loop {
            state = match self.step(state, &body).await {
                SaveState::Done => return Ok(()),
                SaveState::Fatal(err) => {
                    tracing::error!(error = %err, "Failed to save snapshot");
                    return Err(err);
                }
                next => next,
            };
        }
    }
}
