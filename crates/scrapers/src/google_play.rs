//! Google Play adapter.
//!
//! Google Play has no public API, so the listing page is fetched as HTML and
//! version/date are grepped out of the raw markup. The page structure is
//! undocumented and drifts: patterns are tried in a fixed priority order and
//! the first match wins. A pattern that stops matching leaves its field at
//! the unknown sentinel instead of failing the scrape.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use storewatch_core::dates::parse_google_play_date;
use storewatch_core::types::{ScrapeResult, StoreKind, StoreTarget, UNKNOWN};

use crate::client::ensure_success;
use crate::error::ScrapeError;
use crate::scraper::{require_identifier, StoreScraper};

/// "Updated on" label followed by the date text in the next element.
const UPDATED_ON_PATTERN: &str = r">Updated on<[\s\S]{1,200}?>\s*(\w[\w\s,]*)<";

/// Version patterns, highest priority first.
const VERSION_PATTERNS: &[&str] = &[
    // Embedded AF_initDataCallback array.
    r#"\[\[\["([\d.]+)"\]\],\[\[\[\d+\]\],\[\[\[\d+,"[\d.]+"\]\]\]\]\]"#,
    // "About this app" dialog.
    r"About this (?:app|game)[\s\S]{1,5000}?Version[\s\S]{1,300}?([\d.]+)",
    // Bare "Version" label.
    r#"Version[\s<>"]+([0-9.]+)"#,
    // schema.org JSON-LD.
    r#""softwareVersion"\s*:\s*"([^"]+)""#,
];

/// The long bounded repetitions need more room than the default limit.
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .expect("valid regex")
}

static UPDATED_ON_RE: LazyLock<Regex> = LazyLock::new(|| compile(UPDATED_ON_PATTERN));

static VERSION_RES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| VERSION_PATTERNS.iter().map(|p| compile(p)).collect());

pub struct GooglePlayScraper {
    client: reqwest::Client,
    details_url: String,
}

impl GooglePlayScraper {
    pub fn new(client: reqwest::Client, details_url: String) -> Self {
        Self {
            client,
            details_url,
        }
    }
}

/// First capture of the first pattern that matches.
fn first_capture<'h>(patterns: &[Regex], html: &'h str) -> Option<&'h str> {
    patterns
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
}

/// Extract version and date from a listing page. Never fails.
pub fn parse_listing(html: &str) -> ScrapeResult {
    let last_update_date = UPDATED_ON_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| parse_google_play_date(m.as_str()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let version = first_capture(&VERSION_RES, html)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string());

    ScrapeResult {
        version,
        last_update_date,
        icon: String::new(),
    }
}

#[async_trait]
impl StoreScraper for GooglePlayScraper {
    fn kind(&self) -> StoreKind {
        StoreKind::GooglePlay
    }

    async fn scrape(&self, target: &StoreTarget) -> Result<ScrapeResult, ScrapeError> {
        let package_id = require_identifier(target, StoreKind::GooglePlay)?;

        let response = self
            .client
            .get(&self.details_url)
            .query(&[("id", package_id), ("hl", "en")])
            .send()
            .await?;
        let html = ensure_success(response)?.text().await?;

        let result = parse_listing(&html);
        if result.version == UNKNOWN {
            tracing::debug!(package_id, "No version pattern matched the listing page");
        }
        Ok(result)
    }
}
