//! Error types for the portfolio core.
//!
//! Client operations do not surface these to callers directly; they are
//! carried inside [`crate::network::Fetch::Failed`] so callers can tell a
//! degraded result apart from a genuinely empty one.

use thiserror::Error;

/// Main error type for the portfolio core.
#[derive(Debug, Error)]
pub enum FolioError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limited by {service}, resets at {reset_at:?}")]
    RateLimited {
        service: String,
        reset_at: Option<u64>,
    },

    // GitHub API errors
    #[error("GitHub API error: {message}")]
    GitHubApi {
        message: String,
        status_code: Option<u16>,
    },

    #[error("GITHUB_TOKEN is required for {operation}")]
    MissingToken { operation: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for portfolio core operations.
pub type Result<T> = std::result::Result<T, FolioError>;

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for FolioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FolioError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            FolioError::Network {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl FolioError {
    /// HTTP status reported by GitHub, if this error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FolioError::GitHubApi { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether the failure came from the transport rather than from GitHub.
    pub fn is_transport(&self) -> bool {
        matches!(self, FolioError::Network { .. } | FolioError::Timeout(_))
    }
}
