//! Apple App Store adapter, backed by the public iTunes lookup API.

use async_trait::async_trait;
use serde::Deserialize;
use storewatch_core::dates::format_iso_date;
use storewatch_core::types::{ScrapeResult, StoreKind, StoreTarget, UNKNOWN};

use crate::client::{decode_json, ensure_success, non_empty};
use crate::error::ScrapeError;
use crate::scraper::{require_identifier, StoreScraper};

const SCHEMA_NAME: &str = "iTunes";

/// `GET /lookup?id=` response body.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    version: Option<String>,
    current_version_release_date: Option<String>,
    #[serde(rename = "artworkUrl512")]
    artwork_url_512: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}

pub struct AppStoreScraper {
    client: reqwest::Client,
    lookup_url: String,
}

impl AppStoreScraper {
    pub fn new(client: reqwest::Client, lookup_url: String) -> Self {
        Self { client, lookup_url }
    }
}

#[async_trait]
impl StoreScraper for AppStoreScraper {
    fn kind(&self) -> StoreKind {
        StoreKind::AppStore
    }

    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
        let app_id = require_identifier(target, StoreKind::AppStore)?;

        let response = self
            .client
            .get(&self.lookup_url)
            .query(&[("id", app_id)])
            .send()
            .await?;
        let response = ensure_success(response)?;
        let lookup: LookupResponse = decode_json(response, SCHEMA_NAME).await?;

        let app = lookup
            .results
            .into_iter()
            .next()
            .ok_or(ScrapeError::NotFound)?;

        Ok(ScrapeResult {
            version: non_empty(app.version).unwrap_or_else(|| UNKNOWN.to_string()),
            last_update_date: non_empty(app.current_version_release_date)
                .map(|d| format_iso_date(&d))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            icon: non_empty(app.artwork_url_512)
                .or_else(|| non_empty(app.artwork_url_100))
                .unwrap_or_default(),
        })
    }
}
