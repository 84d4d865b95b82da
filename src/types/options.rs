//! Per-request options

use std::collections::HashMap;
use typed_builder::TypedBuilder;

/// Default number of refresh-and-retry cycles after a 401
pub const DEFAULT_TOKEN_EXPIRATION_RETRIES: u32 = 1;

/// Options accepted by every dispatcher method
///
/// ```
/// use nypl_data_api_client::RequestOptions;
///
/// let options = RequestOptions::builder()
///     .cache(true)
///     .token_expiration_retries(3)
///     .build();
/// assert!(options.authenticate);
/// assert!(options.json);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for RequestOptions"),
    builder_type(doc = "Builder for RequestOptions", vis = "pub"),
    build_method(doc = "Build the RequestOptions")
)]
pub struct RequestOptions {
    /// Attach a bearer token (default: true)
    #[builder(default = true)]
    pub authenticate: bool,

    /// Send and parse JSON (default: true)
    ///
    /// Adds `Accept` and `Content-Type: application/json` unless overridden in
    /// [`headers`](Self::headers).
    #[builder(default = true)]
    pub json: bool,

    /// Memoize the response (default: false, ignored for anything but GET)
    #[builder(default)]
    pub cache: bool,

    /// Extra request headers; these win over the JSON defaults
    #[builder(default, setter(into))]
    pub headers: HashMap<String, String>,

    /// Refresh-and-retry cycles allowed after a 401 (default: 1)
    #[builder(default = DEFAULT_TOKEN_EXPIRATION_RETRIES)]
    pub token_expiration_retries: u32,

    /// Fail with `DataApiError::Response` on a non-2xx status (default: false)
    #[builder(default)]
    pub throw_for_status: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RequestOptions {
    /// Options for an unauthenticated request
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            authenticate: false,
            ..Self::default()
        }
    }

    /// Options for a cached GET
    #[must_use]
    pub fn cached() -> Self {
        Self {
            cache: true,
            ..Self::default()
        }
    }

    /// Add a header, replacing any previous value for the same name
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
