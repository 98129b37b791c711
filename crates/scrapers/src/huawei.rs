//! Huawei AppGallery adapter.
//!
//! The detail API is gated behind a short-lived interface token:
//!
//! 1. `POST getInterfaceCode` with a random per-request `Identity-Id` and
//!    browser-like headers returns a base code (a JSON string).
//! 2. The base code is suffixed with the current epoch millis to form a
//!    one-time `Interface-Code`, sent together with the same identity on the
//!    `GET` detail request.
//!
//! The detail payload is a list of layout sections holding data items.
//! Version and date are taken independently across all items; a later
//! non-empty value replaces an earlier one. The icon keeps the first
//! non-empty value.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, ORIGIN, REFERER, USER_AGENT};
use serde::{Deserialize, Deserializer};
use storewatch_core::dates::pad_day_month;
use storewatch_core::types::{ScrapeResult, StoreKind, StoreTarget, UNKNOWN};
use uuid::Uuid;

use crate::client::{decode_json, ensure_success, non_empty, BROWSER_USER_AGENT};
use crate::error::ScrapeError;
use crate::scraper::{require_identifier, StoreScraper};

const SCHEMA_NAME: &str = "Huawei";

const IDENTITY_HEADER: &str = "Identity-Id";
const INTERFACE_CODE_HEADER: &str = "Interface-Code";
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const REFERER_VALUE: &str = "https://appgallery.huawei.com/";
const ORIGIN_VALUE: &str = "https://appgallery.huawei.com";
const LOCALE: &str = "es_ES";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabDetail {
    #[serde(default, deserialize_with = "present")]
    layout_data: Option<Vec<LayoutSection>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSection {
    #[serde(default, deserialize_with = "present")]
    data_list: Option<Vec<DetailItem>>,
}

/// Optional field that may be omitted but not sent as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailItem {
    version_name: Option<String>,
    version: Option<String>,
    release_date: Option<String>,
    update_time: Option<String>,
    icon: Option<String>,
}

pub struct HuaweiScraper {
    client: reqwest::Client,
    interface_code_url: String,
    tab_detail_url: String,
}

impl HuaweiScraper {
    pub fn new(client: reqwest::Client, interface_code_url: String, tab_detail_url: String) -> Self {
        Self {
            client,
            interface_code_url,
            tab_detail_url,
        }
    }

    /// Step 1: obtain the base interface code for `identity`.
    async fn fetch_interface_code(&self, identity: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .post(&self.interface_code_url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(IDENTITY_HEADER, identity)
            .header(REFERER, REFERER_VALUE)
            .header(ORIGIN, ORIGIN_VALUE)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::InterfaceCodeStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(serde_json::Value::String(code)) => Ok(code),
            _ => Err(ScrapeError::InterfaceCodeFormat),
        }
    }

    /// Step 2: fetch the tab detail document for `app_id`.
    async fn fetch_details(
        &self,
        app_id: &str,
        identity: &str,
        interface_code: &str,
    ) -> Result<TabDetail, ScrapeError> {
        let uri = format!("app|{app_id}");
        let response = self
            .client
            .get(&self.tab_detail_url)
            .query(&[
                ("method", "internal.getTabDetail"),
                ("serviceType", "20"),
                ("reqPageNum", "1"),
                ("maxResults", "25"),
                ("uri", uri.as_str()),
                ("appid", app_id),
                ("zone", ""),
                ("locale", LOCALE),
            ])
            .header(ACCEPT, ACCEPT_VALUE)
            .header(IDENTITY_HEADER, identity)
            .header(INTERFACE_CODE_HEADER, interface_code)
            .header(REFERER, REFERER_VALUE)
            .header(ORIGIN, ORIGIN_VALUE)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let response = ensure_success(response)?;
        decode_json(response, SCHEMA_NAME).await
    }
}

/// Random dashless UUID v4 used as the per-request client identity.
fn generate_identity_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One-time interface code: base code suffixed with the current epoch millis.
fn derive_interface_code(base: &str) -> String {
    format!("{base}_{}", Utc::now().timestamp_millis())
}

fn extract_details(detail: TabDetail) -> Result<ScrapeResult, ScrapeError> {
    let mut version: Option<String> = None;
    let mut date: Option<String> = None;
    let mut icon: Option<String> = None;

    let items = detail
        .layout_data
        .unwrap_or_default()
        .into_iter()
        .flat_map(|section| section.data_list.unwrap_or_default());

    for item in items {
        if let Some(v) = non_empty(item.version_name).or_else(|| non_empty(item.version)) {
            version = Some(v);
        }
        if let Some(d) = non_empty(item.release_date).or_else(|| non_empty(item.update_time)) {
            date = Some(d);
        }
        if icon.is_none() {
            icon = non_empty(item.icon);
        }
    }

    if version.is_none() && date.is_none() {
        return Err(ScrapeError::DetailsMissing);
    }

    Ok(ScrapeResult {
        version: version.unwrap_or_else(|| UNKNOWN.to_string()),
        last_update_date: date
            .map(|d| pad_day_month(&d))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        icon: icon.unwrap_or_default(),
    })
}

#[async_trait]
impl StoreScraper for HuaweiScraper {
    fn kind(&self) -> StoreKind {
        StoreKind::Huawei
    }

    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
        let app_id = require_identifier(target, StoreKind::Huawei)?;

        let identity = generate_identity_id();
        let base_code = self.fetch_interface_code(&identity).await?;
        let interface_code = derive_interface_code(&base_code);

        let detail = self.fetch_details(app_id, &identity, &interface_code).await?;
        extract_details(detail)
    }
}
