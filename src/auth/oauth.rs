//! OAuth 2.0 client-credentials exchange

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::token::AccessToken;
use crate::config::OAuthCredentials;
use crate::error::DataApiError;

/// Errors that can occur during the token exchange
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Authorization server answered with a non-success status
    #[error("HTTP {status} from token endpoint: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Authorization server rejected the grant
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<OAuthError> for DataApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Reqwest(e) => DataApiError::transport(format!("Token request failed: {e}")),
            other => DataApiError::token_fetch(other.to_string()),
        }
    }
}

/// Result type for OAuth operations
pub type AuthResult<T> = Result<T, OAuthError>;

/// Capability to trade client credentials for an access token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Perform one client-credentials grant
    ///
    /// # Errors
    /// Returns error if the authorization server rejects the grant or is unreachable
    async fn exchange(&self, credentials: &OAuthCredentials) -> crate::Result<AccessToken>;
}

/// Successful response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<u64>,
}

/// Error response from token endpoint
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth client performing the client-credentials grant over HTTP
#[derive(Debug, Clone, Default)]
pub struct OAuthClient {
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Create an OAuth client with a default `reqwest` client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an OAuth client around an existing `reqwest` client
    #[must_use]
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Request a token from the authorization server
    ///
    /// Sends `grant_type=client_credentials` with the key and secret as a
    /// form-encoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server reports an error, or
    /// the response carries no access token.
    pub async fn request_token(&self, credentials: &OAuthCredentials) -> AuthResult<AccessToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.key.as_str()),
            ("client_secret", credentials.secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&credentials.token_url)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        // Prefer the server's own explanation when it gives one
        if let Ok(error) = serde_json::from_str::<ErrorResponse>(&response_text) {
            let msg = error.error_description.unwrap_or(error.error);
            return Err(OAuthError::TokenExchange(msg));
        }

        if !status.is_success() {
            return Err(OAuthError::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&response_text).map_err(|e| {
            OAuthError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        if token_response.access_token.is_empty() {
            return Err(OAuthError::InvalidResponse(
                "Token response carried an empty access_token".to_string(),
            ));
        }

        Ok(AccessToken::new(token_response.access_token))
    }
}

#[async_trait]
impl TokenExchange for OAuthClient {
    async fn exchange(&self, credentials: &OAuthCredentials) -> crate::Result<AccessToken> {
        Ok(self.request_token(credentials).await?)
    }
}
