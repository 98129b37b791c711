//! Store type → adapter mapping.

use std::sync::Arc;

use storewatch_core::types::StoreKind;

use crate::app_store::AppStoreScraper;
use crate::client::StoreEndpoints;
use crate::error::ScrapeError;
use crate::google_play::GooglePlayScraper;
use crate::huawei::HuaweiScraper;
use crate::microsoft_store::MicrosoftStoreScraper;
use crate::scraper::StoreScraper;

/// One adapter instance per store kind, sharing one HTTP client.
#[derive(Clone)]
pub struct ScraperSet {
    app_store: Arc<dyn StoreScraper>,
    google_play: Arc<dyn StoreScraper>,
    microsoft_store: Arc<dyn StoreScraper>,
    huawei: Arc<dyn StoreScraper>,
}

impl ScraperSet {
    pub fn new(client: reqwest::Client, endpoints: StoreEndpoints) -> Self {
        Self {
            app_store: Arc::new(AppStoreScraper::new(
                client.clone(),
                endpoints.itunes_lookup,
            )),
            google_play: Arc::new(GooglePlayScraper::new(
                client.clone(),
                endpoints.google_play_details,
            )),
            microsoft_store: Arc::new(MicrosoftStoreScraper::new(
                client.clone(),
                endpoints.microsoft_product_details,
            )),
            huawei: Arc::new(HuaweiScraper::new(
                client,
                endpoints.huawei_interface_code,
                endpoints.huawei_tab_detail,
            )),
        }
    }

    /// Assemble a set from explicit adapters, one per store kind.
    pub fn from_adapters(
        app_store: Arc<dyn StoreScraper>,
        google_play: Arc<dyn StoreScraper>,
        microsoft_store: Arc<dyn StoreScraper>,
        huawei: Arc<dyn StoreScraper>,
    ) -> Self {
        Self {
            app_store,
            google_play,
            microsoft_store,
            huawei,
        }
    }

    /// Adapter for a known store kind.
    pub fn for_kind(&self, kind: StoreKind) -> &dyn StoreScraper {
        match kind {
            StoreKind::AppStore => self.app_store.as_ref(),
            StoreKind::GooglePlay => self.google_play.as_ref(),
            StoreKind::MicrosoftStore => self.microsoft_store.as_ref(),
            StoreKind::Huawei => self.huawei.as_ref(),
        }
    }

    /// Adapter for a catalog `type` value. Unknown types fail immediately.
    pub fn select(&self, kind: &str) -> Result<&dyn StoreScraper, ScrapeError> {
        StoreKind::from_name(kind)
            .map(|k| self.for_kind(k))
            .ok_or_else(|| ScrapeError::UnsupportedStore(kind.to_string()))
    }
}
