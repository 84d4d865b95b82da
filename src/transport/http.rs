//! `reqwest`-backed transport implementation

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{DataApiError, Result};

/// Transport that performs requests with a shared [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing client (timeouts, proxies, TLS...)
    #[must_use]
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// The underlying `reqwest` client
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http_client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DataApiError::transport(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DataApiError::transport(format!("Failed to read response body from {url}: {e}"))
        })?;

        Ok(HttpResponse::new(status, body))
    }
}
