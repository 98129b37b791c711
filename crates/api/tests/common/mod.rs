#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::TimeDelta;
use http_body_util::BodyExt;
use tower::ServiceExt;

use storewatch_api::config::{ServerConfig, StorageBackend};
use storewatch_api::router::build_app_router;
use storewatch_api::state::AppState;
use storewatch_core::cooldown::CooldownGate;
use storewatch_core::types::{App, Catalog, DashboardData, ScrapeResult, StoreKind, StoreTarget};
use storewatch_scrapers::{Aggregator, ScrapeError, ScraperSet, StoreScraper};
use storewatch_storage::{SnapshotStore, StorageError};

pub const TEST_SECRET: &str = "let-me-in";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        scrape_timeout_secs: 5,
        catalog_path: PathBuf::from("catalog.json"),
        cooldown_minutes: 60,
        update_secret: Some(TEST_SECRET.to_string()),
        storage_backend: StorageBackend::Local,
        data_path: PathBuf::from("data.json"),
    }
}

// ---------------------------------------------------------------------------
// In-memory snapshot store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<DashboardData>>,
    fail_saves: bool,
    fail_fetches: bool,
    pub saves: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn with_snapshot(snapshot: DashboardData) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub fn failing_saves(self) -> Self {
        Self {
            fail_saves: true,
            ..self
        }
    }

    pub fn failing_fetches(self) -> Self {
        Self {
            fail_fetches: true,
            ..self
        }
    }

    pub fn current(&self) -> Option<DashboardData> {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn fetch(&self) -> Result<Option<DashboardData>, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches {
            return Err(StorageError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &DashboardData) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(StorageError::ConflictExhausted { attempts: 3 });
        }
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scripted store adapters
// ---------------------------------------------------------------------------

/// Answers every lookup with a fixed version, or fails with HTTP 503.
pub struct StaticScraper {
    kind: StoreKind,
    fail: bool,
}

#[async_trait]
impl StoreScraper for StaticScraper {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
        if self.fail {
            return Err(ScrapeError::HttpStatus { status: 503 });
        }
        Ok(ScrapeResult {
            version: format!("1.0.0-{}", target.id),
            last_update_date: "15/05/2024".into(),
            icon: format!("https://cdn.example.com/{}.png", target.id),
        })
    }
}

/// Adapters for every store kind; kinds listed in `failing` return errors.
pub fn scrapers(failing: &[StoreKind]) -> ScraperSet {
    let make = |kind: StoreKind| -> Arc<dyn StoreScraper> {
        Arc::new(StaticScraper {
            kind,
            fail: failing.contains(&kind),
        })
    };
    ScraperSet::from_adapters(
        make(StoreKind::AppStore),
        make(StoreKind::GooglePlay),
        make(StoreKind::MicrosoftStore),
        make(StoreKind::Huawei),
    )
}

fn target(id: &str, kind: StoreKind) -> StoreTarget {
    StoreTarget {
        id: id.into(),
        name: kind.label().into(),
        url: format!("https://stores.example.com/{id}"),
        kind: kind.name().into(),
        app_id: Some("123".into()),
        package_id: Some("com.example".into()),
        product_id: Some("9NBLGGH".into()),
    }
}

pub fn test_catalog() -> Catalog {
    Catalog {
        apps: vec![
            App {
                id: "wallet".into(),
                name: "Wallet".into(),
                icon: String::new(),
                stores: vec![
                    target("ios", StoreKind::AppStore),
                    target("android", StoreKind::GooglePlay),
                ],
            },
            App {
                id: "notes".into(),
                name: "Notes".into(),
                icon: "https://cdn.example.com/notes.png".into(),
                stores: vec![
                    target("windows", StoreKind::MicrosoftStore),
                    target("appgallery", StoreKind::Huawei),
                ],
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers over the
/// given store, catalog and adapters.
pub fn build_test_app(store: Arc<MemoryStore>, catalog: Catalog, scrapers: ScraperSet) -> Router {
    let config = test_config();
    let gate = CooldownGate::new(
        TimeDelta::minutes(config.cooldown_minutes),
        config.update_secret.clone(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
        store,
        aggregator: Arc::new(Aggregator::new(scrapers)),
        gate: Arc::new(gate),
    };

    build_app_router(state, &config)
}

/// Default app: test catalog, every adapter succeeding.
pub fn default_app(store: Arc<MemoryStore>) -> Router {
    build_test_app(store, test_catalog(), scrapers(&[]))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_update(app: Router, secret: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri("/api/v1/update");
    if let Some(secret) = secret {
        builder = builder.header("x-update-secret", secret);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
