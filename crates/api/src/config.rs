use std::path::PathBuf;
use std::str::FromStr;

/// Where the snapshot is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// A file in a GitHub repository (see `GithubConfig`).
    Github,
    /// A JSON file on local disk at `data_path`.
    Local,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. GitHub storage
/// credentials are read separately by `GithubConfig::from_env`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Covers a whole
    /// aggregation run.
    pub request_timeout_secs: u64,
    /// Per-request timeout for store calls in seconds (default: `30`).
    pub scrape_timeout_secs: u64,
    /// Application catalog file (default: `catalog.json`).
    pub catalog_path: PathBuf,
    /// Minimum minutes between aggregation runs (default: `60`).
    pub cooldown_minutes: i64,
    /// Shared secret that bypasses the cooldown. Unset disables the override.
    pub update_secret: Option<String>,
    /// Snapshot backend (default: `github`).
    pub storage_backend: StorageBackend,
    /// Snapshot file for the local backend (default: `data.json`).
    pub data_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `SCRAPE_TIMEOUT_SECS`  | `30`                       |
    /// | `CATALOG_PATH`         | `catalog.json`             |
    /// | `COOLDOWN_MINUTES`     | `60`                       |
    /// | `UPDATE_SECRET`        | unset                      |
    /// | `STORAGE_BACKEND`      | `github`                   |
    /// | `DATA_PATH`            | `data.json`                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let scrape_timeout_secs: u64 = std::env::var("SCRAPE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SCRAPE_TIMEOUT_SECS must be a valid u64");

        let catalog_path = std::env::var("CATALOG_PATH")
            .unwrap_or_else(|_| "catalog.json".into())
            .into();

        let cooldown_minutes: i64 = std::env::var("COOLDOWN_MINUTES")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("COOLDOWN_MINUTES must be a valid i64");

        let update_secret = std::env::var("UPDATE_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let storage_backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "github".into())
            .parse()
            .unwrap_or_else(|e| panic!("STORAGE_BACKEND: {e}"));

        let data_path = std::env::var("DATA_PATH")
            .unwrap_or_else(|_| "data.json".into())
            .into();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            scrape_timeout_secs,
            catalog_path,
            cooldown_minutes,
            update_secret,
            storage_backend,
            data_path,
        }
    }
}
