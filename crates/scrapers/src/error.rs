/// Errors from a single store lookup.
///
/// Variants are grouped by [`ScrapeError::kind`] so operators can tell an
/// unreachable store apart from one that changed its response format.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The target lacks the identifier its store type requires.
    #[error("Missing {field}")]
    MissingIdentifier { field: &'static str },

    /// The catalog declares a store type with no adapter.
    #[error("Unsupported store type: {0}")]
    UnsupportedStore(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// The body did not match the expected response shape.
    #[error("Invalid {store} API response structure")]
    Schema { store: &'static str, detail: String },

    /// The lookup succeeded but returned no listing.
    #[error("App not found")]
    NotFound,

    /// Huawei authorization step answered with a non-2xx status.
    #[error("Failed to get interface code: {status}")]
    InterfaceCodeStatus { status: u16 },

    /// Huawei authorization step did not return a JSON string.
    #[error("Invalid Interface-Code response format")]
    InterfaceCodeFormat,

    /// Huawei details were well-formed but carried neither version nor date.
    #[error("Could not find app details in Huawei response structure")]
    DetailsMissing,
}

impl ScrapeError {
    /// Failure category used in logs and trigger responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingIdentifier { .. } | Self::UnsupportedStore(_) => "config",
            Self::Request(_) | Self::HttpStatus { .. } | Self::InterfaceCodeStatus { .. } => {
                "transport"
            }
            Self::Schema { .. } | Self::InterfaceCodeFormat => "schema",
            Self::NotFound | Self::DetailsMissing => "not_found",
        }
    }
}
