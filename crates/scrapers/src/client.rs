//! Shared HTTP plumbing for the store adapters.
//!
//! All adapters share one [`reqwest::Client`] (connection pooling) and take
//! their base URLs from [`StoreEndpoints`] so tests can point them at a
//! local server.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ScrapeError;

/// Default per-request timeout applied by the transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Desktop browser identity sent to stores that reject unknown clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Base URLs of every store transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEndpoints {
    /// iTunes lookup API (`?id=` is appended).
    pub itunes_lookup: String,
    /// Google Play listing page (`?id=&hl=en` is appended).
    pub google_play_details: String,
    /// Microsoft Store product details (`/{productId}` is appended).
    pub microsoft_product_details: String,
    /// Huawei interface-code (authorization) endpoint.
    pub huawei_interface_code: String,
    /// Huawei tab-detail endpoint.
    pub huawei_tab_detail: String,
}

impl Default for StoreEndpoints {
    fn default() -> Self {
        Self {
            itunes_lookup: "https://itunes.apple.com/lookup".into(),
            google_play_details: "https://play.google.com/store/apps/details".into(),
            microsoft_product_details:
                "https://apps.microsoft.com/api/ProductsDetails/GetProductDetailsById".into(),
            huawei_interface_code:
                "https://web-dre.hispace.dbankcloud.com/edge/webedge/getInterfaceCode".into(),
            huawei_tab_detail: "https://web-dre.hispace.dbankcloud.com/edge/uowap/index".into(),
        }
    }
}

impl StoreEndpoints {
    /// Point every endpoint at one base URL, using the same paths as a
    /// local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            itunes_lookup: format!("{base}/lookup"),
            google_play_details: format!("{base}/store/apps/details"),
            microsoft_product_details: format!("{base}/api/ProductsDetails/GetProductDetailsById"),
            huawei_interface_code: format!("{base}/edge/webedge/getInterfaceCode"),
            huawei_tab_detail: format!("{base}/edge/uowap/index"),
        }
    }
}

/// Build the HTTP client shared by all adapters.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Return the response unchanged on a 2xx status, otherwise
/// [`ScrapeError::HttpStatus`].
pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ScrapeError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Read the body and validate it against `T`.
///
/// Any body that is not valid JSON of the expected shape is a schema
/// failure, distinct from transport failures.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    store: &'static str,
) -> Result<T, ScrapeError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::debug!(store, error = %e, "Response schema validation failed");
        ScrapeError::Schema {
            store,
            detail: e.to_string(),
        }
    })
}

/// `Some(value)` only when the value is present and non-blank.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
