//! Transport layer for talking HTTP to the Data API
//!
//! This module provides the transport abstraction the client sends requests
//! through, plus the default implementation backed by `reqwest`. Tests and
//! embedding applications can supply their own [`HttpTransport`].

pub mod http;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::error::Result;

/// A fully prepared outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Body text, already serialized
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request with no headers and no body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Raw response as returned by the transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Body text; empty when the server sent none
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the response carries a body worth parsing
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Transport trait for performing HTTP calls
///
/// Implementations report network-level failures as
/// `DataApiError::Transport` and return every HTTP status, including errors,
/// as an `Ok` response; status classification happens in the executor.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and collect the full response body
    ///
    /// # Errors
    /// Returns error if the request could not be delivered or the body not read
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub use http::ReqwestTransport;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_bodies_are_absent() {
        assert!(!HttpResponse::new(StatusCode::NO_CONTENT, "").has_body());
        assert!(!HttpResponse::new(StatusCode::OK, " \n").has_body());
        assert!(HttpResponse::new(StatusCode::OK, "{}").has_body());
    }

    #[test]
    fn test_request_starts_bare() {
        let request = HttpRequest::new(Method::GET, "https://x/api/v0.1/bibs");
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }
}
