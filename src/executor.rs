//! Request execution and response classification
//!
//! The executor performs one HTTP round trip and turns the outcome into a
//! `Result`: a 401 becomes [`DataApiError::TokenExpiration`], a non-2xx status
//! becomes [`DataApiError::Response`] when strict status checking is on, and
//! everything else is returned as-is.

use std::sync::Arc;

use reqwest::StatusCode;

use crate::error::{DataApiError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::Payload;

/// Performs single requests through an [`HttpTransport`]
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    /// Create an executor over `transport`
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Send `request` and classify the response
    ///
    /// # Errors
    ///
    /// - `DataApiError::TokenExpiration` on HTTP 401
    /// - `DataApiError::Response` on any other non-2xx status when `throw_for_status` is set
    /// - transport errors unchanged
    pub async fn execute(&self, request: HttpRequest, throw_for_status: bool) -> Result<HttpResponse> {
        let url = request.url.clone();
        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status.as_u16(), url = %url, "Received response");

        classify(&url, response, throw_for_status)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}

fn classify(url: &str, response: HttpResponse, throw_for_status: bool) -> Result<HttpResponse> {
    if response.status == StatusCode::UNAUTHORIZED {
        return Err(DataApiError::token_expiration(url));
    }

    if throw_for_status && !response.status.is_success() {
        return Err(DataApiError::response(
            url,
            response.status.as_u16(),
            response.body,
        ));
    }

    Ok(response)
}

/// Parse a response body into a payload
///
/// An empty body yields `None` without any parsing, so a 204 never fails.
///
/// # Errors
///
/// Returns `DataApiError::JsonDecode` if `json` is set and the body is not valid JSON.
pub fn parse_payload(response: HttpResponse, json: bool) -> Result<Option<Payload>> {
    if !response.has_body() {
        return Ok(None);
    }

    if json {
        Ok(Some(Payload::Json(serde_json::from_str(&response.body)?)))
    } else {
        Ok(Some(Payload::Text(response.body)))
    }
}
