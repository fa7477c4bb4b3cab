use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid listing URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Fetching {url} timed out after {timeout_secs}s")]
    FetchTimeout { url: String, timeout_secs: u64 },

    #[error("Fetching {url} failed with HTTP {status}")]
    FetchHttpError { url: String, status: u16 },

    #[error("Fetched page is too short ({len} chars, expected at least {min})")]
    FetchEmptyContent { len: usize, min: usize },

    #[error("Browser fetch is disabled; set LISTING_IMPORT_BROWSER_ENABLED=1 to enable it")]
    BrowserDisabled,

    #[error("Failed to launch browser: {reason}")]
    BrowserLaunchFailure { reason: String },

    #[error("Browser navigation failed: {reason}")]
    BrowserNavigation { reason: String },

    #[error("Failed to parse embedded state: {reason}")]
    StructuredParseFailure { reason: String },

    #[error("No credential configured for {provider}; set {env_var}")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Model call failed: {message}")]
    ModelError { message: String },

    #[error("Model reply is not a JSON object: {reason}")]
    UnparsableResponse { reason: String },

    #[error("No usable content found on the page")]
    NoUsableContent,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Stable failure classes a caller can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    TargetUnreachable,
    BrowserUnavailable,
    AiNotConfigured,
    AiFailed,
    NoUsableContent,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::TargetUnreachable => "target_unreachable",
            Self::BrowserUnavailable => "browser_unavailable",
            Self::AiNotConfigured => "ai_not_configured",
            Self::AiFailed => "ai_failed",
            Self::NoUsableContent => "no_usable_content",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } | Self::Url(_) => ErrorKind::InvalidRequest,
            Self::FetchTimeout { .. }
            | Self::FetchHttpError { .. }
            | Self::FetchEmptyContent { .. }
            | Self::BrowserNavigation { .. }
            | Self::Http(_) => ErrorKind::TargetUnreachable,
            Self::BrowserDisabled | Self::BrowserLaunchFailure { .. } => {
                ErrorKind::BrowserUnavailable
            }
            Self::MissingCredential { .. } => ErrorKind::AiNotConfigured,
            Self::ModelError { .. } | Self::UnparsableResponse { .. } => ErrorKind::AiFailed,
            Self::NoUsableContent => ErrorKind::NoUsableContent,
            Self::StructuredParseFailure { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
