//! # NYPL Data API client for Rust
//!
//! Async client for the NYPL Data API.
//! OAuth2 client credentials, transparent token refresh, optional GET caching.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nypl_data_api_client::{DataApiClient, Payload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads NYPL_API_BASE_URL, NYPL_OAUTH_KEY, NYPL_OAUTH_SECRET, NYPL_OAUTH_URL
//!     let client = DataApiClient::from_env()?;
//!
//!     if let Some(Payload::Json(bib)) = client.get("bibs/sierra-nypl/17746307", None).await? {
//!         println!("{}", bib["title"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Explicit configuration
//!
//! ```no_run
//! # use nypl_data_api_client::{ClientConfig, DataApiClient};
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .base_url("https://platform.nypl.org/api/v0.1/")
//!     .oauth_key("my-key")
//!     .oauth_secret("my-secret")
//!     .oauth_url("https://isso.nypl.org/")
//!     .build();
//!
//! let client = DataApiClient::new(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. Token lifecycle
//!
//! The first authenticated request fetches a token with a client-credentials
//! grant; later requests reuse it. When the API answers 401 the token is
//! dropped and the request is retried with a new one, by default once
//! (`token_expiration_retries`). See [`retry`].
//!
//! ### 3. Response caching
//!
//! ```no_run
//! # use nypl_data_api_client::{DataApiClient, RequestOptions};
//! # async fn example(client: DataApiClient) -> nypl_data_api_client::Result<()> {
//! // Second call is served from memory
//! client.get("current-schemas/Item", Some(RequestOptions::cached())).await?;
//! client.get("current-schemas/Item", Some(RequestOptions::cached())).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Only GET requests are cached; `cache` is ignored for every other verb.
//!
//! ## Architecture
//!
//! - [`client`]: public dispatcher (`get`, `post`, `put`, `patch`, `dangerously_call_delete`)
//! - [`retry`]: bounded refresh-and-retry on 401
//! - [`executor`]: single request execution and status classification
//! - [`auth`]: token exchange and token caching
//! - [`cache`]: in-process response cache
//! - [`transport`]: HTTP transport abstraction and `reqwest` implementation
//! - [`config`]: configuration and environment fallback
//! - [`types`]: request options, bodies and payloads
//! - [`error`]: error types
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! [`LogLevel::directive`] turns the configured level into an `EnvFilter` directive:
//!
//! ```no_run
//! # use nypl_data_api_client::DataApiClient;
//! # fn example(client: &DataApiClient) {
//! let level = client.config().log_level();
//! tracing_subscriber::fmt()
//!     .with_env_filter(tracing_subscriber::EnvFilter::new(level.directive()))
//!     .init();
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, DataApiError>`](Result):
//!
//! ```no_run
//! # use nypl_data_api_client::{DataApiClient, DataApiError};
//! # async fn example(client: DataApiClient) {
//! match client.get("bibs", None).await {
//!     Ok(payload) => { /* ... */ }
//!     Err(DataApiError::TokenRefresh(msg)) => {
//!         eprintln!("Credentials rejected: {msg}");
//!     }
//!     Err(e) => {
//!         eprintln!("Error: {e}");
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod retry;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use auth::{AccessToken, OAuthClient, TokenExchange, TokenManager};
pub use client::{DataApiClient, DataApiClientBuilder};
pub use config::{ClientConfig, LogLevel, OAuthCredentials};
pub use error::{DataApiError, Result};
pub use reqwest::Method;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{Body, Payload, RequestOptions};

/// Version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
