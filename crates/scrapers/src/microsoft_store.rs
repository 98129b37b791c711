//! Microsoft Store adapter, backed by the product-details JSON endpoint.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use storewatch_core::dates::format_iso_date;
use storewatch_core::types::{ScrapeResult, StoreKind, StoreTarget, UNKNOWN};

use crate::client::{decode_json, ensure_success, non_empty};
use crate::error::ScrapeError;
use crate::scraper::{require_identifier, StoreScraper};

const SCHEMA_NAME: &str = "Microsoft Store";

/// Market and language sent with every product lookup.
const MARKET: &str = "ES";
const LANGUAGE: &str = "es-ES";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDetails {
    installer: Option<Installer>,
    package_last_update_date_utc: Option<String>,
    icon_url: Option<String>,
}

/// Architectures keep the order the store returned them in.
#[derive(Debug, Deserialize)]
struct Installer {
    architectures: IndexMap<String, Architecture>,
}

#[derive(Debug, Deserialize)]
struct Architecture {
    version: Option<String>,
}

pub struct MicrosoftStoreScraper {
    client: reqwest::Client,
    details_url: String,
}

impl MicrosoftStoreScraper {
    pub fn new(client: reqwest::Client, details_url: String) -> Self {
        Self {
            client,
            details_url,
        }
    }
}

#[async_trait]
impl StoreScraper for MicrosoftStoreScraper {
    fn kind(&self) -> StoreKind {
        StoreKind::MicrosoftStore
    }

    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
        let product_id = require_identifier(target, StoreKind::MicrosoftStore)?;

        let response = self
            .client
            .get(format!("{}/{}", self.details_url, product_id))
            .query(&[("gl", MARKET), ("hl", LANGUAGE)])
            .send()
            .await?;
        let response = ensure_success(response)?;
        let details: ProductDetails = decode_json(response, SCHEMA_NAME).await?;

        // No architecture preference: the first entry the store lists wins.
        let version = details
            .installer
            .and_then(|i| i.architectures.into_values().next())
            .and_then(|arch| non_empty(arch.version))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Ok(ScrapeResult {
            version,
            last_update_date: non_empty(details.package_last_update_date_utc)
                .map(|d| format_iso_date(&d))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            icon: non_empty(details.icon_url).unwrap_or_default(),
        })
    }
}
