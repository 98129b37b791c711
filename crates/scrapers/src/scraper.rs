use async_trait::async_trait;
use storewatch_core::types::{ScrapeResult, StoreKind, StoreTarget};

use crate::error::ScrapeError;

/// One store's implementation of the scrape contract.
///
/// Implementations hold no per-call state and are safe to invoke
/// concurrently and repeatedly.
#[async_trait]
pub trait StoreScraper: Send + Sync {
    /// The store this adapter serves.
    fn kind(&self) -> StoreKind;

    /// Fetch and normalize the listing described by `target`.
    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError>;
}

/// Resolve the identifier `kind` requires, or fail with
/// [`ScrapeError::MissingIdentifier`].
pub(crate) fn require_identifier(
    target: &StoreTarget,
    kind: StoreKind,
) -> Result<&str, ScrapeError> {
    target
        .identifier(kind)
        .ok_or(ScrapeError::MissingIdentifier {
            field: kind.identifier_field(),
        })
}
