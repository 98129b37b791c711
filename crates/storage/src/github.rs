//! GitHub repository contents API as a [`ContentsBackend`].
//!
//! The snapshot lives in one file of a repository. Reads return the blob SHA
//! as the revision token; writes must send it back and are rejected with
//! 409/422 when another commit replaced the file in between.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, IF_NONE_MATCH, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::{ContentsBackend, RemoteFile};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PATH: &str = "data.json";

const COMMIT_MESSAGE: &str = "chore(data): update data.json";
const COMMITTER_NAME: &str = "Netlify";
const COMMITTER_EMAIL: &str = "bot@netlify.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("storewatch/", env!("CARGO_PKG_VERSION"));

/// Location of and credentials for the snapshot file.
#[derive(Debug, Clone, Default)]
pub struct GithubConfig {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// File path inside the repository (default: `data.json`).
    pub path: String,
    /// Branch to read and commit to; the repository default when unset.
    pub branch: Option<String>,
    /// API base (default: `https://api.github.com`).
    pub api_url: String,
}

impl GithubConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var          | Default                  |
    /// |------------------|--------------------------|
    /// | `GITHUB_TOKEN`   | unset (required)         |
    /// | `GITHUB_OWNER`   | unset (required)         |
    /// | `GITHUB_REPO`    | unset (required)         |
    /// | `GITHUB_PATH`    | `data.json`              |
    /// | `GITHUB_BRANCH`  | unset                    |
    /// | `GITHUB_API_URL` | `https://api.github.com` |
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            token: var("GITHUB_TOKEN"),
            owner: var("GITHUB_OWNER"),
            repo: var("GITHUB_REPO"),
            path: var("GITHUB_PATH").unwrap_or_else(|| DEFAULT_PATH.into()),
            branch: var("GITHUB_BRANCH"),
            api_url: var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
        }
    }

    /// Names of the required variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("GITHUB_TOKEN", &self.token),
            ("GITHUB_OWNER", &self.owner),
            ("GITHUB_REPO", &self.repo),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Resolved, complete settings.
#[derive(Debug, Clone)]
struct Resolved {
    token: String,
    contents_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File(ContentsFile),
    Directory(Vec<serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct ContentsFile {
    sha: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct Signature {
    name: &'static str,
    email: &'static str,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    author: Signature,
    committer: Signature,
}

fn signature() -> Signature {
    Signature {
        name: COMMITTER_NAME,
        email: COMMITTER_EMAIL,
    }
}

pub struct GithubContents {
    client: reqwest::Client,
    resolved: Result<Resolved, String>,
    branch: Option<String>,
}

impl GithubContents {
    /// Build the backend. Missing credentials are logged and every call
    /// then fails with [`StorageError::NotConfigured`].
    pub fn new(client: reqwest::Client, config: GithubConfig) -> Self {
        let missing = config.missing();
        let resolved = match (config.token, config.owner, config.repo) {
            (Some(token), Some(owner), Some(repo)) => Ok(Resolved {
                token,
                contents_url: format!(
                    "{}/repos/{owner}/{repo}/contents/{}",
                    config.api_url.trim_end_matches('/'),
                    config.path.trim_start_matches('/'),
                ),
            }),
            _ => {
                tracing::warn!(
                    missing = ?missing,
                    "GitHub storage is not configured; reads and writes will fail"
                );
                Err(missing.join(", "))
            }
        };

        Self {
            client,
            resolved,
            branch: config.branch,
        }
    }

    fn resolved(&self) -> Result<&Resolved, StorageError> {
        self.resolved
            .as_ref()
            .map_err(|missing| StorageError::NotConfigured {
                missing: missing.clone(),
            })
    }

    fn request(&self, method: reqwest::Method, resolved: &Resolved) -> reqwest::RequestBuilder {
        self.client
            .request(method, &resolved.contents_url)
            .header(AUTHORIZATION, format!("Bearer {}", resolved.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }
}

/// Map a non-2xx response to [`StorageError::Status`], keeping the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status {
        status: status.as_u16(),
        body,
    })
}

/// GitHub wraps base64 content at 60 columns.
fn decode_content(encoded: &str) -> Result<String, StorageError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StorageError::Decode(format!("base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Decode(format!("utf-8: {e}")))
}

#[async_trait]
impl ContentsBackend for GithubContents {
    async fn read(&self) -> Result<Option<RemoteFile>, StorageError> {
        let resolved = self.resolved()?;

        let mut request = self
            .request(reqwest::Method::GET, resolved)
            // Empty validator defeats GitHub's conditional-request caching.
            .header(IF_NONE_MATCH, "");
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;

        match response.json::<ContentsResponse>().await? {
            ContentsResponse::File(file) => {
                let content = decode_content(file.content.as_deref().unwrap_or_default())?;
                Ok(Some(RemoteFile {
                    revision: file.sha,
                    content,
                }))
            }
            ContentsResponse::Directory(_) => Err(StorageError::Decode(
                "path points at a directory, not a file".into(),
            )),
        }
    }

    async fn write(&self, content: &str, revision: Option<&str>) -> Result<(), StorageError> {
        let resolved = self.resolved()?;

        let body = PutContents {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(content),
            sha: revision,
            branch: self.branch.as_deref(),
            author: signature(),
            committer: signature(),
        };

        let response = self
            .request(reqwest::Method::PUT, resolved)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
