//! Catalog and snapshot types shared by the scraper, storage, and API crates.
//!
//! Field names are serialized in camelCase because the persisted snapshot
//! (`data.json`) is consumed as-is by the dashboard.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Sentinel for a version or date the store did not expose.
pub const UNKNOWN: &str = "N/A";

// ---------------------------------------------------------------------------
// Store kinds
// ---------------------------------------------------------------------------

/// The distribution stores a listing can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    #[serde(rename = "itunes")]
    AppStore,
    #[serde(rename = "google-play")]
    GooglePlay,
    #[serde(rename = "microsoft")]
    MicrosoftStore,
    #[serde(rename = "huawei")]
    Huawei,
}

impl StoreKind {
    pub const ALL: [StoreKind; 4] = [
        StoreKind::AppStore,
        StoreKind::GooglePlay,
        StoreKind::MicrosoftStore,
        StoreKind::Huawei,
    ];

    /// Parse from the catalog `type` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "itunes" => Some(Self::AppStore),
            "google-play" => Some(Self::GooglePlay),
            "microsoft" => Some(Self::MicrosoftStore),
            "huawei" => Some(Self::Huawei),
            _ => None,
        }
    }

    /// Catalog `type` value.
    pub fn name(self) -> &'static str {
        match self {
            Self::AppStore => "itunes",
            Self::GooglePlay => "google-play",
            Self::MicrosoftStore => "microsoft",
            Self::Huawei => "huawei",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AppStore => "App Store",
            Self::GooglePlay => "Google Play",
            Self::MicrosoftStore => "Microsoft Store",
            Self::Huawei => "Huawei AppGallery",
        }
    }

    /// Name of the catalog field carrying this store's listing identifier.
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::AppStore | Self::Huawei => "appId",
            Self::GooglePlay => "packageId",
            Self::MicrosoftStore => "productId",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One store listing of one application.
///
/// `kind` stays the raw catalog string so an unknown store type fails only
/// the affected target at scrape time rather than the whole catalog load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTarget {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl StoreTarget {
    /// The listing identifier that `kind` requires, if present and non-blank.
    pub fn identifier(&self, kind: StoreKind) -> Option<&str> {
        let value = match kind {
            StoreKind::AppStore | StoreKind::Huawei => self.app_id.as_deref(),
            StoreKind::GooglePlay => self.package_id.as_deref(),
            StoreKind::MicrosoftStore => self.product_id.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// A tracked application and its store listings, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub stores: Vec<StoreTarget>,
}

/// The full set of tracked applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub apps: Vec<App>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let catalog: Catalog = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Ensure app ids are unique and store ids are unique within each app.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut app_ids = HashSet::new();
        for app in &self.apps {
            if app.id.trim().is_empty() {
                return Err(CoreError::Validation("App id must not be empty".into()));
            }
            if !app_ids.insert(app.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate app id '{}'",
                    app.id
                )));
            }

            let mut store_ids = HashSet::new();
            for target in &app.stores {
                if !store_ids.insert(target.id.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "Duplicate store id '{}' in app '{}'",
                        target.id, app.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of store targets across all apps.
    pub fn target_count(&self) -> usize {
        self.apps.iter().map(|a| a.stores.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Scrape results and snapshot
// ---------------------------------------------------------------------------

/// Normalized output of one adapter invocation.
///
/// `version` is an opaque display string; nothing compares versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub version: String,
    pub last_update_date: String,
    #[serde(default)]
    pub icon: String,
}

impl Default for ScrapeResult {
    fn default() -> Self {
        Self {
            version: UNKNOWN.to_string(),
            last_update_date: UNKNOWN.to_string(),
            icon: String::new(),
        }
    }
}

/// One store listing inside a snapshot.
///
/// A failed lookup keeps `version`/`lastUpdateDate` null and records the
/// failure in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    pub version: Option<String>,
    pub last_update_date: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreEntry {
    pub fn scraped(target: &StoreTarget, result: ScrapeResult) -> Self {
        Self {
            id: target.id.clone(),
            name: target.name.clone(),
            url: target.url.clone(),
            version: Some(result.version),
            last_update_date: Some(result.last_update_date),
            icon: result.icon,
            error: None,
        }
    }

    pub fn failed(target: &StoreTarget, message: String) -> Self {
        Self {
            id: target.id.clone(),
            name: target.name.clone(),
            url: target.url.clone(),
            version: None,
            last_update_date: None,
            icon: String::new(),
            error: Some(message),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// An application inside a snapshot, with one entry per catalog store target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub stores: Vec<StoreEntry>,
}

/// The persisted and served snapshot. Always replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub last_update: Timestamp,
    pub apps: Vec<AppEntry>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const CATALOG: &str = r#"{
        "apps": [
            {
                "id": "wallet",
                "name": "Wallet",
                "icon": "https://example.com/wallet.png",
                "stores": [
                    { "id": "ios", "name": "App Store", "url": "https://apps.apple.com/app/id1", "type": "itunes", "appId": "123456" },
                    { "id": "android", "name": "Google Play", "url": "https://play.google.com", "type": "google-play", "packageId": "com.example.wallet" }
                ]
            }
        ]
    }"#;

    #[test]
    fn store_kind_round_trips_catalog_names() {
        for kind in StoreKind::ALL {
            assert_eq!(StoreKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StoreKind::from_name("f-droid"), None);
    }

    #[test]
    fn catalog_parses_camel_case_identifiers() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.target_count(), 2);
        let android = &catalog.apps[0].stores[1];
        assert_eq!(android.kind, "google-play");
        assert_eq!(
            android.identifier(StoreKind::GooglePlay),
            Some("com.example.wallet")
        );
        assert_eq!(android.identifier(StoreKind::MicrosoftStore), None);
    }

    #[test]
    fn blank_identifier_counts_as_missing() {
        let target = StoreTarget {
            id: "ios".into(),
            name: String::new(),
            url: String::new(),
            kind: "itunes".into(),
            app_id: Some("  ".into()),
            package_id: None,
            product_id: None,
        };
        assert_eq!(target.identifier(StoreKind::AppStore), None);
    }

    #[test]
    fn duplicate_store_ids_are_rejected() {
        let raw = r#"{ "apps": [ { "id": "a", "name": "A", "stores": [
            { "id": "s", "type": "itunes", "appId": "1" },
            { "id": "s", "type": "huawei", "appId": "C1" }
        ] } ] }"#;
        assert_matches!(Catalog::from_json(raw), Err(CoreError::Validation(msg)) if msg.contains("Duplicate store id"));
    }

    #[test]
    fn duplicate_app_ids_are_rejected() {
        let raw = r#"{ "apps": [ { "id": "a", "name": "A" }, { "id": "a", "name": "B" } ] }"#;
        assert_matches!(Catalog::from_json(raw), Err(CoreError::Validation(_)));
    }

    #[test]
    fn snapshot_serializes_with_stable_field_names() {
        let target = StoreTarget {
            id: "ios".into(),
            name: "App Store".into(),
            url: "https://apps.apple.com".into(),
            kind: "itunes".into(),
            app_id: Some("1".into()),
            package_id: None,
            product_id: None,
        };
        let snapshot = DashboardData {
            last_update: "2024-05-15T08:00:00Z".parse().unwrap(),
            apps: vec![AppEntry {
                id: "wallet".into(),
                name: "Wallet".into(),
                icon: String::new(),
                stores: vec![
                    StoreEntry::scraped(
                        &target,
                        ScrapeResult {
                            version: "2.5.1".into(),
                            last_update_date: "27/10/2023".into(),
                            icon: String::new(),
                        },
                    ),
                    StoreEntry::failed(&target, "HTTP 404".into()),
                ],
            }],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lastUpdate"], "2024-05-15T08:00:00Z");
        let stores = &json["apps"][0]["stores"];
        assert_eq!(stores[0]["version"], "2.5.1");
        assert_eq!(stores[0]["lastUpdateDate"], "27/10/2023");
        assert!(stores[0].get("error").is_none());
        assert!(stores[1]["version"].is_null());
        assert_eq!(stores[1]["error"], "HTTP 404");
    }
}
