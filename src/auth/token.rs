//! Access token caching and invalidation

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::oauth::TokenExchange;
use crate::config::ClientConfig;
use crate::error::Result;

/// Opaque bearer token
///
/// Valid until the API says otherwise; there is no expiry timestamp.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the Authorization header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"<redacted>").finish()
    }
}

impl From<String> for AccessToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lazily fetches and caches the client's access token
///
/// Fetches are serialized: concurrent callers that find no token wait for the
/// first caller's exchange and share its result.
pub struct TokenManager {
    config: Arc<ClientConfig>,
    exchange: Arc<dyn TokenExchange>,
    token: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    /// Create a token manager with no token yet
    pub fn new(config: Arc<ClientConfig>, exchange: Arc<dyn TokenExchange>) -> Self {
        Self {
            config,
            exchange,
            token: Mutex::new(None),
        }
    }

    /// Return the cached token, fetching one if there is none
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if the OAuth key, secret or URL is
    /// missing, or the exchange's error if the grant is rejected.
    pub async fn get_token(&self) -> Result<AccessToken> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            tracing::debug!("Resolving cached token");
            return Ok(token.clone());
        }

        let credentials = self.config.oauth_credentials()?;

        tracing::debug!(token_url = %credentials.token_url, "Fetching token");
        let token = self.exchange.exchange(&credentials).await.map_err(|e| {
            tracing::error!("Failure getting token: {e}");
            e
        })?;

        tracing::debug!("Resolving new token");
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Forget the cached token so the next [`get_token`](Self::get_token) refetches
    pub async fn invalidate(&self) {
        tracing::debug!("Invalidating cached token");
        self.token.lock().await.take();
    }

    /// Invalidate and immediately fetch a replacement
    ///
    /// # Errors
    ///
    /// Same as [`get_token`](Self::get_token).
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.invalidate().await;
        self.get_token().await
    }

    /// Whether a token is currently cached
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthCredentials;
    use crate::error::DataApiError;
    use crate::testing::{CountingExchange, test_config};
    use async_trait::async_trait;
    use std::time::Duration;

    struct RejectingExchange;

    #[async_trait]
    impl TokenExchange for RejectingExchange {
        async fn exchange(&self, _credentials: &OAuthCredentials) -> Result<AccessToken> {
            Err(DataApiError::token_fetch("invalid_client"))
        }
    }

    fn config() -> Arc<ClientConfig> {
        Arc::new(test_config())
    }

    #[tokio::test]
    async fn test_token_is_fetched_once_and_cached() {
        let exchange = Arc::new(CountingExchange::default());
        let manager = TokenManager::new(config(), exchange.clone());

        assert!(!manager.has_token().await);
        let first = manager.get_token().await.unwrap();
        let second = manager.get_token().await.unwrap();

        assert_eq!(first.as_str(), "token-1");
        assert_eq!(first, second);
        assert_eq!(exchange.calls(), 1);
        assert!(manager.has_token().await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let exchange = Arc::new(CountingExchange::default());
        let manager = TokenManager::new(config(), exchange.clone());

        manager.get_token().await.unwrap();
        manager.invalidate().await;
        assert!(!manager.has_token().await);

        let token = manager.get_token().await.unwrap();
        assert_eq!(token.as_str(), "token-2");
        assert_eq!(exchange.calls(), 2);

        let refreshed = manager.refresh().await.unwrap();
        assert_eq!(refreshed.as_str(), "token-3");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let exchange = Arc::new(CountingExchange::default());
        let config = Arc::new(ClientConfig::builder().oauth_key("only-key").build());
        let manager = TokenManager::new(config, exchange.clone());

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, DataApiError::Config(_)));
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_grant_propagates_and_caches_nothing() {
        let manager = TokenManager::new(config(), Arc::new(RejectingExchange));

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, DataApiError::TokenFetch(_)));
        assert!(!manager.has_token().await);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let exchange = Arc::new(CountingExchange::with_delay(Duration::from_millis(50)));
        let manager = Arc::new(TokenManager::new(config(), exchange.clone()));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().as_str(), "token-1");
        }
        assert_eq!(exchange.calls(), 1);
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
        assert_eq!(token.authorization_header(), "Bearer super-secret");
    }
}
