//! OAuth authentication module for the Data API
//!
//! Provides OAuth 2.0 client-credentials authentication.
//!
//! # Overview
//!
//! The Data API accepts bearer tokens obtained by exchanging a client key and
//! secret at `{oauth_url}/oauth/token`. Tokens carry no expiry the client can
//! rely on, so they are kept until the API rejects one:
//!
//! 1. [`TokenManager::get_token`] returns the cached token or fetches a new one
//! 2. A 401 from the API makes the retry coordinator call
//!    [`TokenManager::invalidate`]
//! 3. The next `get_token` performs a fresh exchange
//!
//! The exchange itself sits behind the [`TokenExchange`] trait;
//! [`OAuthClient`] is the HTTP implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nypl_data_api_client::ClientConfig;
//! use nypl_data_api_client::auth::{OAuthClient, TokenManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ClientConfig::from_env()?);
//! let tokens = TokenManager::new(config, Arc::new(OAuthClient::new()));
//!
//! let token = tokens.get_token().await?;
//! println!("Authorization: {}", token.authorization_header());
//! # Ok(())
//! # }
//! ```

mod oauth;
mod token;

pub use oauth::{AuthResult, OAuthClient, OAuthError, TokenExchange};
pub use token::{AccessToken, TokenManager};
