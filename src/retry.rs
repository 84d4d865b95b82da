//! Bounded refresh-and-retry around the request executor
//!
//! Authenticated requests are sent with the current bearer token. When the
//! API answers 401 the coordinator invalidates the token and tries again with
//! a freshly fetched one, at most `token_expiration_retries` times. Once the
//! budget is spent it gives up with [`DataApiError::TokenRefresh`].
//!
//! The retry is linear with no delay: a token refresh either works or it
//! doesn't, so there is nothing to back off from.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::auth::TokenManager;
use crate::error::{DataApiError, Result};
use crate::executor::RequestExecutor;
use crate::transport::{HttpRequest, HttpResponse};

/// How a single logical request should be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attach a bearer token
    pub authenticate: bool,
    /// Refresh-and-retry cycles allowed after a 401
    pub token_expiration_retries: u32,
    /// Raise on non-2xx statuses
    pub throw_for_status: bool,
}

/// Wraps [`RequestExecutor`] with token acquisition and 401 recovery
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    tokens: Arc<TokenManager>,
    executor: RequestExecutor,
}

impl RetryCoordinator {
    /// Create a coordinator
    pub fn new(tokens: Arc<TokenManager>, executor: RequestExecutor) -> Self {
        Self { tokens, executor }
    }

    /// The token manager requests are authenticated with
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Run `request` under `policy`
    ///
    /// # Errors
    ///
    /// - `DataApiError::TokenRefresh` when every retry still got a 401
    /// - `DataApiError::TokenExpiration` only for unauthenticated requests
    /// - token fetch, configuration and executor errors unchanged
    pub async fn run(&self, request: HttpRequest, policy: RetryPolicy) -> Result<HttpResponse> {
        if !policy.authenticate {
            return self.executor.execute(request, policy.throw_for_status).await;
        }

        let mut retries_remaining = policy.token_expiration_retries;
        loop {
            let token = self.tokens.get_token().await?;

            let mut attempt = request.clone();
            let header = HeaderValue::from_str(&token.authorization_header())
                .map_err(|_| DataApiError::request("Access token is not a valid header value"))?;
            attempt.headers.insert(AUTHORIZATION, header);

            match self.executor.execute(attempt, policy.throw_for_status).await {
                Err(e) if e.is_token_expiration() => {
                    if retries_remaining == 0 {
                        tracing::warn!(url = %request.url, "Exhausted retries refreshing token");
                        return Err(DataApiError::token_refresh("Exhausted retries refreshing token"));
                    }
                    tracing::debug!(
                        retries_remaining,
                        url = %request.url,
                        "Expired OAuth token detected"
                    );
                    self.tokens.invalidate().await;
                    retries_remaining -= 1;
                }
                other => return other,
            }
        }
    }
}
