//! Store adapters and the aggregation engine.
//!
//! Each supported store has one adapter implementing [`StoreScraper`]. The
//! [`ScraperSet`] maps a catalog `type` value to its adapter and the
//! [`Aggregator`] runs every catalog target concurrently, folding the
//! outcomes into a [`DashboardData`](storewatch_core::types::DashboardData)
//! snapshot.

pub mod aggregate;
pub mod app_store;
pub mod client;
pub mod error;
pub mod google_play;
pub mod huawei;
pub mod microsoft_store;
pub mod scraper;
pub mod selector;

#[cfg(test)]
mod test_support;

pub use aggregate::{AggregationReport, Aggregator, TargetFailure};
pub use client::{build_http_client, StoreEndpoints};
pub use error::ScrapeError;
pub use scraper::StoreScraper;
pub use selector::ScraperSet;
