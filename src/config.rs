//! Client configuration
//!
//! [`ClientConfig`] holds the API base URL and the OAuth client-credentials
//! triple. Any field left unset can be filled from the environment:
//!
//! | Field          | Environment variable  |
//! |----------------|-----------------------|
//! | `base_url`     | `NYPL_API_BASE_URL`   |
//! | `oauth_key`    | `NYPL_OAUTH_KEY`      |
//! | `oauth_secret` | `NYPL_OAUTH_SECRET`   |
//! | `oauth_url`    | `NYPL_OAUTH_URL`      |
//! | `log_level`    | `LOG_LEVEL`           |
//!
//! Missing values are only reported when they are needed: the base URL when a
//! request URL is built, the OAuth triple when a token is fetched.

use std::fmt;
use std::str::FromStr;

use typed_builder::TypedBuilder;

use crate::error::{DataApiError, Result};

/// Environment variable for the API base URL
pub const ENV_BASE_URL: &str = "NYPL_API_BASE_URL";
/// Environment variable for the OAuth client key
pub const ENV_OAUTH_KEY: &str = "NYPL_OAUTH_KEY";
/// Environment variable for the OAuth client secret
pub const ENV_OAUTH_SECRET: &str = "NYPL_OAUTH_SECRET";
/// Environment variable for the OAuth base URL
pub const ENV_OAUTH_URL: &str = "NYPL_OAUTH_URL";
/// Environment variable for the log level
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Path of the token endpoint, relative to `oauth_url`
pub const TOKEN_PATH: &str = "oauth/token";

/// Log verbosity for the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Request lifecycle details
    Debug,
    /// Informational
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    #[default]
    Error,
    /// Nothing
    Silent,
}

impl LogLevel {
    /// `EnvFilter` directive scoped to this crate
    #[must_use]
    pub fn directive(self) -> String {
        format!("nypl_data_api_client={}", self.as_filter())
    }

    /// Level name as understood by `tracing_subscriber::EnvFilter`
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Silent => "off",
        }
    }
}

impl FromStr for LogLevel {
    type Err = DataApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "silent" | "off" | "none" => Ok(Self::Silent),
            other => Err(DataApiError::config(format!("Unknown log level: {other}"))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// OAuth client-credentials triple, validated
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// Client key
    pub key: String,
    /// Client secret
    pub secret: String,
    /// Fully resolved token endpoint
    pub token_url: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("key", &self.key)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

/// Configuration for [`DataApiClient`](crate::DataApiClient)
///
/// Immutable once handed to the client.
#[derive(Clone, Default, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ClientConfig"),
    builder_type(doc = "Builder for ClientConfig", vis = "pub"),
    build_method(doc = "Build the ClientConfig")
)]
pub struct ClientConfig {
    /// Base URL for the API (e.g. `https://host/api/v0.1/`)
    #[builder(default, setter(strip_option, into))]
    pub base_url: Option<String>,

    /// OAuth client key
    #[builder(default, setter(strip_option, into))]
    pub oauth_key: Option<String>,

    /// OAuth client secret
    #[builder(default, setter(strip_option, into))]
    pub oauth_secret: Option<String>,

    /// OAuth *base* URL; the token endpoint is derived from it
    #[builder(default, setter(strip_option, into))]
    pub oauth_url: Option<String>,

    /// Log level; [`LogLevel::Error`] when unset
    #[builder(default, setter(strip_option))]
    pub log_level: Option<LogLevel>,
}

impl ClientConfig {
    /// Build a configuration entirely from the process environment
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if `LOG_LEVEL` holds an unknown level.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_fallback()
    }

    /// Fill absent fields from the process environment
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if `LOG_LEVEL` is read and holds an unknown level.
    pub fn with_env_fallback(self) -> Result<Self> {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fill absent fields from an arbitrary settings source
    ///
    /// `lookup` receives the environment variable name of each missing field.
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if the looked-up log level is unknown.
    pub fn with_fallback<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |current: Option<String>, name: &str| {
            non_empty(current).or_else(|| non_empty(lookup(name)))
        };

        let log_level = match self.log_level {
            Some(explicit) => Some(explicit),
            None => non_empty(lookup(ENV_LOG_LEVEL))
                .map(|level| level.parse::<LogLevel>())
                .transpose()?,
        };

        Ok(Self {
            base_url: get(self.base_url, ENV_BASE_URL),
            oauth_key: get(self.oauth_key, ENV_OAUTH_KEY),
            oauth_secret: get(self.oauth_secret, ENV_OAUTH_SECRET),
            oauth_url: get(self.oauth_url, ENV_OAUTH_URL),
            log_level,
        })
    }

    /// Effective log level
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// The API base URL
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if no base URL is configured.
    pub fn base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DataApiError::config(format!(
                    "API base url not set (may be set in config.base_url or ENV[{ENV_BASE_URL}])"
                ))
            })
    }

    /// Full URL for `path`: plain concatenation onto the base URL
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if no base URL is configured.
    pub fn full_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{path}", self.base_url()?))
    }

    /// The OAuth triple with the token endpoint resolved
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if any of key, secret or OAuth URL is missing.
    pub fn oauth_credentials(&self) -> Result<OAuthCredentials> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        match (
            present(&self.oauth_key),
            present(&self.oauth_secret),
            present(&self.oauth_url),
        ) {
            (Some(key), Some(secret), Some(url)) => Ok(OAuthCredentials {
                key,
                secret,
                token_url: token_endpoint(&url),
            }),
            _ => Err(DataApiError::config(format!(
                "OAuth config not set (need {ENV_OAUTH_KEY}, {ENV_OAUTH_SECRET} and {ENV_OAUTH_URL})"
            ))),
        }
    }

    /// Check that everything an authenticated request needs is present
    ///
    /// # Errors
    ///
    /// Returns the first `DataApiError::Config` encountered.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        self.oauth_credentials()?;
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("oauth_key", &self.oauth_key)
            .field("oauth_secret", &self.oauth_secret.as_ref().map(|_| "<redacted>"))
            .field("oauth_url", &self.oauth_url)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Join `oauth_url` and [`TOKEN_PATH`] with exactly one slash
#[must_use]
pub fn token_endpoint(oauth_url: &str) -> String {
    format!("{}/{TOKEN_PATH}", oauth_url.trim_end_matches('/'))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
