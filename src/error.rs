//! Error types for the NYPL Data API client

use thiserror::Error;

/// Main error type for the Data API client
#[derive(Error, Debug)]
pub enum DataApiError {
    /// Required configuration (base URL or OAuth credentials) missing at time of use
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be constructed from the supplied options
    #[error("Request error: {0}")]
    Request(String),

    /// The API answered 401 for a request
    ///
    /// Raised by the request executor and consumed by the retry coordinator.
    /// Callers only see it if they drive the executor directly.
    #[error("Detected token expiration fetching {url}")]
    TokenExpiration {
        /// URL that was rejected
        url: String,
    },

    /// The API kept rejecting freshly fetched tokens until the retry budget ran out
    #[error("Token refresh error: {0}")]
    TokenRefresh(String),

    /// Non-2xx response while strict status checking was requested
    #[error("Invalid response ({status}) for {url}: {body}")]
    Response {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// The authorization server rejected the client-credentials grant
    #[error("Token fetch error: {0}")]
    TokenFetch(String),

    /// Network-level failure (DNS, connection refused, timeout...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON decode error when parsing a response body
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// JSON encode error
    #[error("JSON encode error: {0}")]
    JsonEncode(String),
}

/// Result type alias for Data API operations
pub type Result<T> = std::result::Result<T, DataApiError>;

impl DataApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a request construction error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a token expiration signal for `url`
    pub fn token_expiration(url: impl Into<String>) -> Self {
        Self::TokenExpiration { url: url.into() }
    }

    /// Create a token refresh (retries exhausted) error
    pub fn token_refresh(msg: impl Into<String>) -> Self {
        Self::TokenRefresh(msg.into())
    }

    /// Create a response error
    pub fn response(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Response {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a token fetch error
    pub fn token_fetch(msg: impl Into<String>) -> Self {
        Self::TokenFetch(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a JSON encode error
    pub fn json_encode(msg: impl Into<String>) -> Self {
        Self::JsonEncode(msg.into())
    }

    /// Whether this is the 401 signal that triggers a token refresh
    #[must_use]
    pub fn is_token_expiration(&self) -> bool {
        matches!(self, Self::TokenExpiration { .. })
    }

    /// HTTP status carried by the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::TokenExpiration { .. } => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DataApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
