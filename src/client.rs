//! `DataApiClient`, the public request surface
//!
//! Every call goes through the same pipeline:
//!
//! ```text
//! get / post / put / patch / dangerously_call_delete
//!        │
//!        ▼
//!  normalize options ── cache forced off for non-GET
//!  validate body     ── json=true needs an object/array body
//!  build full URL    ── base_url + path
//!        │
//!        ├── cache hit (GET, cache=true) ──────────────► payload
//!        ▼
//!  RetryCoordinator ── TokenManager ── RequestExecutor ── HttpTransport
//!        │
//!        ▼
//!  parse payload (empty body → None) ── store in cache ──► payload
//! ```
//!
//! # Example
//!
//! ```no_run
//! use nypl_data_api_client::{DataApiClient, RequestOptions};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DataApiClient::from_env()?;
//!
//! // Public endpoint, cached for the life of the client
//! let schema = client
//!     .get(
//!         "current-schemas/Item",
//!         Some(RequestOptions::builder().authenticate(false).cache(true).build()),
//!     )
//!     .await?;
//!
//! // Authenticated write
//! client
//!     .patch("hold-requests/1234", json!({"success": true, "processed": true}), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::auth::{OAuthClient, TokenExchange, TokenManager};
use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::{DataApiError, Result};
use crate::executor::{RequestExecutor, parse_payload};
use crate::retry::{RetryCoordinator, RetryPolicy};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::types::{Body, Payload, RequestOptions};

const APPLICATION_JSON: &str = "application/json";

/// Builder for [`DataApiClient`]
#[derive(Default)]
pub struct DataApiClientBuilder {
    config: Option<ClientConfig>,
    skip_env: bool,
    transport: Option<Arc<dyn HttpTransport>>,
    token_exchange: Option<Arc<dyn TokenExchange>>,
}

impl DataApiClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Do not fill missing configuration from the environment
    #[must_use]
    pub fn without_env_fallback(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Use a custom HTTP transport for API requests
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom client-credentials exchange
    #[must_use]
    pub fn token_exchange(mut self, exchange: Arc<dyn TokenExchange>) -> Self {
        self.token_exchange = Some(exchange);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if the environment holds an unknown `LOG_LEVEL`.
    pub fn build(self) -> Result<DataApiClient> {
        let config = self.config.unwrap_or_default();
        let config = if self.skip_env {
            config
        } else {
            config.with_env_fallback()?
        };
        let config = Arc::new(config);

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let exchange = self
            .token_exchange
            .unwrap_or_else(|| Arc::new(OAuthClient::new()));

        let tokens = Arc::new(TokenManager::new(config.clone(), exchange));
        let coordinator = RetryCoordinator::new(tokens, RequestExecutor::new(transport));

        Ok(DataApiClient {
            config,
            coordinator,
            cache: ResponseCache::new(),
        })
    }
}

/// Authenticated client for the Data API
///
/// Owns its token and its response cache; share one instance (e.g. behind an
/// `Arc`) to share both.
#[derive(Debug)]
pub struct DataApiClient {
    config: Arc<ClientConfig>,
    coordinator: RetryCoordinator,
    cache: ResponseCache,
}

impl DataApiClient {
    /// Create a client from `config`, filling gaps from the environment
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if the environment holds an unknown `LOG_LEVEL`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a client configured entirely from the environment
    ///
    /// # Errors
    ///
    /// Returns `DataApiError::Config` if the environment holds an unknown `LOG_LEVEL`.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for custom transports and token exchanges
    #[must_use]
    pub fn builder() -> DataApiClientBuilder {
        DataApiClientBuilder::new()
    }

    /// The resolved configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of cached responses
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether an access token is currently held
    pub async fn has_token(&self) -> bool {
        self.coordinator.tokens().has_token().await
    }

    /// GET an API path
    ///
    /// Caching is off unless `options.cache` is set.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str, options: Option<RequestOptions>) -> Result<Option<Payload>> {
        self.request(Method::GET, path, Body::Empty, options).await
    }

    /// POST a body to an API path
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: Option<RequestOptions>,
    ) -> Result<Option<Payload>> {
        self.request(Method::POST, path, body.into(), options).await
    }

    /// PUT a body to an API path
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: Option<RequestOptions>,
    ) -> Result<Option<Payload>> {
        self.request(Method::PUT, path, body.into(), options).await
    }

    /// PATCH a resource at an API path
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: Option<RequestOptions>,
    ) -> Result<Option<Payload>> {
        self.request(Method::PATCH, path, body.into(), options).await
    }

    /// DELETE a resource at an API path
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn dangerously_call_delete(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: Option<RequestOptions>,
    ) -> Result<Option<Payload>> {
        self.request(Method::DELETE, path, body.into(), options).await
    }

    /// Common executor behind every verb
    ///
    /// Returns `Ok(None)` when the response has no body.
    ///
    /// # Errors
    ///
    /// - `DataApiError::Request` if `json` is set and the body is not an object or array,
    ///   or a header is invalid (before any I/O)
    /// - `DataApiError::Config` if the base URL or OAuth settings are missing
    /// - `DataApiError::TokenRefresh` if the token kept being rejected
    /// - `DataApiError::Response` on non-2xx with `throw_for_status`
    /// - transport and JSON decode errors
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: Option<RequestOptions>,
    ) -> Result<Option<Payload>> {
        let mut options = options.unwrap_or_default();

        tracing::debug!(
            method = %method,
            path,
            authenticate = options.authenticate,
            json = options.json,
            cache = options.cache,
            retries = options.token_expiration_retries,
            "Dispatching request"
        );

        // Only GETs are ever cached
        if method != Method::GET {
            options.cache = false;
        }

        if options.json && !body.is_empty() && !body.is_structured() {
            return Err(DataApiError::request(format!(
                "Attempted to {method} with options.json==true, but body is a {}",
                body.kind()
            )));
        }

        let url = self.config.full_url(path)?;
        let headers = build_headers(options.json, &options.headers)?;
        let cache_key = ResponseCache::key(&method, &url);

        if options.cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                tracing::debug!(key = %cache_key, "Cache hit");
                return Ok(Some(cached));
            }
            tracing::debug!(key = %cache_key, "Cache miss");
        }

        let request = HttpRequest {
            method,
            url,
            headers,
            body: body.to_wire()?,
        };
        let policy = RetryPolicy {
            authenticate: options.authenticate,
            token_expiration_retries: options.token_expiration_retries,
            throw_for_status: options.throw_for_status,
        };

        let response = self.coordinator.run(request, policy).await?;
        let payload = parse_payload(response, options.json)?;

        if options.cache {
            if let Some(payload) = &payload {
                self.cache.insert(cache_key, payload.clone());
            }
        }

        Ok(payload)
    }
}

/// JSON defaults first, then caller headers on top
///
/// Header names are case-insensitive, so two caller keys differing only in
/// case (`accept` and `Accept`) are rejected rather than resolved by map order.
fn build_headers(json: bool, extra: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut caller = HeaderMap::with_capacity(extra.len());
    for (name, value) in extra {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DataApiError::request(format!("Invalid header name: {name}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| DataApiError::request(format!("Invalid value for header {name}")))?;
        if caller.insert(header_name.clone(), header_value).is_some() {
            return Err(DataApiError::request(format!(
                "Header {header_name} given more than once"
            )));
        }
    }

    let mut headers = HeaderMap::new();
    if json {
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    }
    for (name, value) in caller {
        if let Some(name) = name {
            headers.insert(name, value);
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingExchange, RecordingTransport, test_config};
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;

    fn client(transport: Arc<RecordingTransport>, exchange: Arc<CountingExchange>) -> DataApiClient {
        DataApiClient::builder()
            .config(test_config())
            .without_env_fallback()
            .transport(transport)
            .token_exchange(exchange)
            .build()
            .unwrap()
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_get_without_cache_hits_transport_every_time() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"id":17746307}"#));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));

        client.get("bibs/sierra-nypl/17746307", None).await.unwrap();
        client.get("bibs/sierra-nypl/17746307", None).await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_get_with_cache_hits_transport_once() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"id":17746307}"#));
        let exchange = Arc::new(CountingExchange::default());
        let client = client(transport.clone(), exchange.clone());

        let first = client
            .get("bibs/sierra-nypl/17746307", Some(RequestOptions::cached()))
            .await
            .unwrap();
        let second = client
            .get("bibs/sierra-nypl/17746307", Some(RequestOptions::cached()))
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(exchange.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second, Some(Payload::Json(json!({"id": 17746307}))));
        assert_eq!(client.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_cache_is_ignored_for_writes() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"ok":true}"#));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));
        let options = RequestOptions::builder().cache(true).build();

        client.post("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.post("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.put("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.put("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.patch("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.patch("schemas/Test", json!({"a": 1}), Some(options.clone())).await.unwrap();
        client.dangerously_call_delete("schemas/Test", (), Some(options.clone())).await.unwrap();
        client.dangerously_call_delete("schemas/Test", (), Some(options)).await.unwrap();

        assert_eq!(transport.calls(), 8);
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_patch_sends_serialized_body_and_headers() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"data":{"id":1234}}"#));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));

        let response = client
            .patch("hold-requests/1234", json!({"success": true, "processed": true}), None)
            .await
            .unwrap();
        assert_eq!(response, Some(Payload::Json(json!({"data": {"id": 1234}}))));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.url, "fake-proto://fake-fqdn/api/v0.1/hold-requests/1234");
        assert_eq!(request.body.as_deref(), Some(r#"{"success":true,"processed":true}"#));
        assert_eq!(header(request, "accept"), Some("application/json"));
        assert_eq!(header(request, "content-type"), Some("application/json"));
        assert_eq!(header(request, "authorization"), Some("Bearer token-1"));
        assert_eq!(request.headers.len(), 3);
    }

    #[tokio::test]
    async fn test_string_body_with_json_is_rejected_before_io() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let exchange = Arc::new(CountingExchange::default());
        let client = client(transport.clone(), exchange.clone());

        let err = client
            .post("schemas/TestSchema", r#"{"name":"TestSchema"}"#, None)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Request error: Attempted to POST with options.json==true, but body is a string"
        );
        assert_eq!(transport.calls(), 0);
        assert_eq!(exchange.calls(), 0);

        let err = client.patch("hold-requests/1234", json!(42), None).await.unwrap_err();
        assert!(matches!(err, DataApiError::Request(ref msg) if msg.ends_with("body is a number")));
    }

    #[tokio::test]
    async fn test_empty_body_is_accepted_with_json() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"ok":true}"#));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));

        let response = client.patch("hold-requests/1234", (), None).await.unwrap();
        assert!(response.is_some());
        assert!(transport.requests()[0].body.is_none());
    }

    #[tokio::test]
    async fn test_plain_text_mode() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"data":{"stream":"TestSchema"}}"#));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));
        let options = RequestOptions::builder().json(false).build();

        let response = client
            .post("schemas/TestSchema", r#"{"name":"TestSchema"}"#, Some(options))
            .await
            .unwrap();

        assert_eq!(
            response.as_ref().and_then(Payload::as_text),
            Some(r#"{"data":{"stream":"TestSchema"}}"#)
        );
        let request = &transport.requests()[0];
        assert_eq!(request.body.as_deref(), Some(r#"{"name":"TestSchema"}"#));
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.headers.get(AUTHORIZATION).is_some());
    }

    #[tokio::test]
    async fn test_empty_response_body_yields_none() {
        let transport = Arc::new(RecordingTransport::new(|_| {
            crate::transport::HttpResponse::new(reqwest::StatusCode::NO_CONTENT, "")
        }));
        let client = client(transport, Arc::new(CountingExchange::default()));

        let response = client
            .dangerously_call_delete("schemas/TestSchema", (), None)
            .await
            .unwrap();
        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn test_caller_headers_override_json_defaults() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));
        let options = RequestOptions::default().with_header("content-type", "application/avro+json");

        client.post("schemas/Test", json!({}), Some(options)).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(header(request, "Content-Type"), Some("application/avro+json"));
        assert_eq!(header(request, "Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_invalid_header_is_request_error() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));
        let options = RequestOptions::default().with_header("bad header", "x");

        let err = client.get("bibs", Some(options)).await.unwrap_err();
        assert!(matches!(err, DataApiError::Request(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_headers_differing_only_in_case_are_rejected() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let client = client(transport.clone(), Arc::new(CountingExchange::default()));
        let options = RequestOptions::default()
            .with_header("accept", "text/plain")
            .with_header("Accept", "application/xml");

        let err = client.get("bibs", Some(options)).await.unwrap_err();
        assert!(matches!(err, DataApiError::Request(ref msg) if msg.contains("accept")));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_get_sends_no_token() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"stream":"Item"}"#));
        let exchange = Arc::new(CountingExchange::default());
        let client = client(transport.clone(), exchange.clone());

        client
            .get("current-schemas/Item", Some(RequestOptions::unauthenticated()))
            .await
            .unwrap();

        assert_eq!(exchange.calls(), 0);
        assert!(!client.has_token().await);
        assert!(transport.requests()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_transparently() {
        let transport = Arc::new(RecordingTransport::accepting(&["token-2"], r#"{"id":1}"#));
        let exchange = Arc::new(CountingExchange::default());
        let client = client(transport.clone(), exchange.clone());

        let response = client.get("bibs?limit=1&offset=0", None).await.unwrap();

        assert_eq!(response, Some(Payload::Json(json!({"id": 1}))));
        assert_eq!(exchange.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_base_url_is_config_error() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let client = DataApiClient::builder()
            .config(ClientConfig::builder().oauth_key("k").build())
            .without_env_fallback()
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client.get("bibs", None).await.unwrap_err();
        assert!(matches!(err, DataApiError::Config(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_oauth_config_fails_authenticated_requests_only() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let client = DataApiClient::builder()
            .config(ClientConfig::builder().base_url(crate::testing::BASE_URL).build())
            .without_env_fallback()
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client.get("bibs", None).await.unwrap_err();
        assert!(matches!(err, DataApiError::Config(_)));

        client
            .get("current-schemas/Item", Some(RequestOptions::unauthenticated()))
            .await
            .unwrap();
        assert_eq!(transport.calls(), 1);
    }
}
