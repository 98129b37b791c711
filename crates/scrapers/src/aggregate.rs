//! Aggregation engine: scrape every catalog target concurrently and collate
//! the outcomes into a fresh snapshot.
//!
//! All lookups of one run are polled together on the calling task and the
//! engine waits for every one of them to settle. A failing target never
//! aborts the run; it is recorded as an explicit failure entry.

use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use storewatch_core::types::{
    App, AppEntry, Catalog, DashboardData, ScrapeResult, StoreEntry, StoreTarget,
};

use crate::error::ScrapeError;
use crate::selector::ScraperSet;

/// A target whose lookup failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub app_id: String,
    pub store_id: String,
    /// Declared catalog store type.
    pub store: String,
    /// Failure category (`config`, `transport`, `schema`, `not_found`).
    pub kind: &'static str,
    pub message: String,
}

/// Result of one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregationReport {
    pub snapshot: DashboardData,
    pub failures: Vec<TargetFailure>,
    pub target_count: usize,
}

impl AggregationReport {
    /// `true` when the catalog had targets and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.target_count > 0 && self.failures.len() == self.target_count
    }
}

pub struct Aggregator {
    scrapers: ScraperSet,
}

impl Aggregator {
    pub fn new(scrapers: ScraperSet) -> Self {
        Self { scrapers }
    }

    /// Scrape every target in `catalog` and build a new snapshot.
    ///
    /// Output keeps catalog declaration order for apps and their stores,
    /// regardless of completion order. `lastUpdate` is the completion time.
    pub async fn run(&self, catalog: &Catalog) -> AggregationReport {
        let started = Instant::now();
        let target_count = catalog.target_count();
        tracing::info!(
            apps = catalog.apps.len(),
            targets = target_count,
            "Starting aggregation run"
        );

        let lookups = catalog.apps.iter().flat_map(|app| {
            app.stores
                .iter()
                .map(move |target| self.scrape_target(app, target))
        });
        let mut outcomes = join_all(lookups).await.into_iter();

        let mut failures = Vec::new();
        let mut apps = Vec::with_capacity(catalog.apps.len());

        // Outcomes come back in input order, one per target.
        for app in &catalog.apps {
            let stores: Vec<StoreEntry> = app
                .stores
                .iter()
                .zip(outcomes.by_ref())
                .map(|(target, outcome)| match outcome {
                    Ok(result) => StoreEntry::scraped(target, result),
                    Err(err) => {
                        failures.push(TargetFailure {
                            app_id: app.id.clone(),
                            store_id: target.id.clone(),
                            store: target.kind.clone(),
                            kind: err.kind(),
                            message: err.to_string(),
                        });
                        StoreEntry::failed(target, err.to_string())
                    }
                })
                .collect();

            apps.push(AppEntry {
                id: app.id.clone(),
                name: app.name.clone(),
                icon: app_icon(app, &stores),
                stores,
            });
        }

        let snapshot = DashboardData {
            last_update: Utc::now(),
            apps,
        };

        tracing::info!(
            targets = target_count,
            failed = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregation run finished"
        );

        AggregationReport {
            snapshot,
            failures,
            target_count,
        }
    }

    async fn scrape_target(
        &self,
        app: &App,
        target: &StoreTarget,
    ) -> Result<ScrapeResult, ScrapeError> {
        let outcome = match self.scrapers.select(&target.kind) {
            Ok(scraper) => scraper.scrape(target).await,
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(result) => tracing::debug!(
                app_id = %app.id,
                target_id = %target.id,
                store = %target.kind,
                version = %result.version,
                "Store lookup succeeded"
            ),
            Err(err) => tracing::warn!(
                app_id = %app.id,
                target_id = %target.id,
                store = %target.kind,
                kind = err.kind(),
                error = %err,
                "Store lookup failed"
            ),
        }
        outcome
    }
}

/// Catalog icon, or the first icon a store returned when the catalog has none.
fn app_icon(app: &App, stores: &[StoreEntry]) -> String {
    if !app.icon.trim().is_empty() {
        return app.icon.clone();
    }
    stores
        .iter()
        .map(|s| s.icon.as_str())
        .find(|icon| !icon.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use storewatch_core::types::{StoreKind, UNKNOWN};

    use super::*;
    use crate::scraper::StoreScraper;

    /// Answers after `delay`, echoing the target id as the version.
    struct FakeScraper {
        kind: StoreKind,
        delay: Duration,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeScraper {
        fn new(kind: StoreKind, delay_ms: u64, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                kind,
                delay: Duration::from_millis(delay_ms),
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StoreScraper for FakeScraper {
        fn kind(&self) -> StoreKind {
            self.kind
        }

        async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ScrapeError::HttpStatus { status: 503 });
            }
            Ok(ScrapeResult {
                version: format!("v-{}", target.id),
                last_update_date: "01/01/2024".into(),
                icon: format!("https://example.com/{}.png", target.id),
            })
        }
    }

    fn target(id: &str, kind: &str) -> StoreTarget {
        StoreTarget {
            id: id.into(),
            name: id.to_uppercase(),
            url: format!("https://example.com/{id}"),
            kind: kind.into(),
            app_id: Some("1".into()),
            package_id: Some("com.example".into()),
            product_id: Some("9N".into()),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            apps: vec![
                App {
                    id: "wallet".into(),
                    name: "Wallet".into(),
                    icon: String::new(),
                    stores: vec![
                        target("ios", "itunes"),
                        target("android", "google-play"),
                    ],
                },
                App {
                    id: "notes".into(),
                    name: "Notes".into(),
                    icon: "https://example.com/notes.png".into(),
                    stores: vec![target("windows", "microsoft"), target("harmony", "huawei")],
                },
            ],
        }
    }

    /// Slowest adapters are declared first so completion order differs from
    /// catalog order.
    fn aggregator(huawei_fails: bool) -> (Aggregator, Vec<Arc<FakeScraper>>) {
        let fakes = vec![
            FakeScraper::new(StoreKind::AppStore, 60, false),
            FakeScraper::new(StoreKind::GooglePlay, 40, false),
            FakeScraper::new(StoreKind::MicrosoftStore, 20, false),
            FakeScraper::new(StoreKind::Huawei, 0, huawei_fails),
        ];
        let set = ScraperSet::from_adapters(
            fakes[0].clone(),
            fakes[1].clone(),
            fakes[2].clone(),
            fakes[3].clone(),
        );
        (Aggregator::new(set), fakes)
    }

    #[tokio::test]
    async fn output_follows_catalog_order() {
        let (aggregator, fakes) = aggregator(false);
        let report = aggregator.run(&catalog()).await;

        assert!(report.failures.is_empty());
        let ids: Vec<Vec<&str>> = report
            .snapshot
            .apps
            .iter()
            .map(|a| a.stores.iter().map(|s| s.id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["ios", "android"], vec!["windows", "harmony"]]);
        assert_eq!(
            report.snapshot.apps[0].stores[1].version.as_deref(),
            Some("v-android")
        );
        for fake in fakes {
            assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_run_concurrently() {
        let (aggregator, _) = aggregator(false);
        let started = tokio::time::Instant::now();
        aggregator.run(&catalog()).await;
        // Virtual time: concurrent lookups take the slowest delay, sequential
        // ones the 120ms sum.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(60), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(120), "{elapsed:?}");
    }

    #[tokio::test]
    async fn failures_are_recorded_without_aborting() {
        let (aggregator, _) = aggregator(true);
        let report = aggregator.run(&catalog()).await;

        assert_eq!(report.failures.len(), 1);
        assert!(!report.all_failed());
        let failure = &report.failures[0];
        assert_eq!(failure.app_id, "notes");
        assert_eq!(failure.store_id, "harmony");
        assert_eq!(failure.kind, "transport");
        assert_eq!(failure.message, "HTTP 503");

        let harmony = &report.snapshot.apps[1].stores[1];
        assert!(harmony.is_failed());
        assert_eq!(harmony.version, None);
        assert_ne!(harmony.version.as_deref(), Some(UNKNOWN));
        assert_eq!(
            report.snapshot.apps[1].stores[0].version.as_deref(),
            Some("v-windows")
        );
    }

    #[tokio::test]
    async fn unknown_store_type_fails_only_its_target() {
        let (aggregator, _) = aggregator(false);
        let mut catalog = catalog();
        catalog.apps[0].stores.push(target("linux", "flathub"));

        let report = aggregator.run(&catalog).await;
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, "config");
        assert_eq!(report.failures[0].message, "Unsupported store type: flathub");
        assert_eq!(report.snapshot.apps[0].stores.len(), 3);
    }

    #[tokio::test]
    async fn missing_icon_falls_back_to_first_store_icon() {
        let (aggregator, _) = aggregator(false);
        let report = aggregator.run(&catalog()).await;

        assert_eq!(report.snapshot.apps[0].icon, "https://example.com/ios.png");
        assert_eq!(report.snapshot.apps[1].icon, "https://example.com/notes.png");
    }

    #[tokio::test]
    async fn empty_catalog_produces_empty_snapshot() {
        let (aggregator, _) = aggregator(false);
        let report = aggregator.run(&Catalog::default()).await;
        assert!(report.snapshot.apps.is_empty());
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn every_target_failing_is_flagged() {
        let failing = FakeScraper::new(StoreKind::Huawei, 0, true);
        let set = ScraperSet::from_adapters(
            failing.clone(),
            failing.clone(),
            failing.clone(),
            failing,
        );
        let report = Aggregator::new(set).run(&catalog()).await;
        assert!(report.all_failed());
    }
}
