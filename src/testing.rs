//! In-memory fakes shared by unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::auth::{AccessToken, TokenExchange};
use crate::config::{ClientConfig, OAuthCredentials};
use crate::error::Result;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

pub(crate) const BASE_URL: &str = "fake-proto://fake-fqdn/api/v0.1/";

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig::builder()
        .base_url(BASE_URL)
        .oauth_key("fake-oauth-key")
        .oauth_secret("fake-oauth-secret")
        .oauth_url("fake-oauth-url/")
        .build()
}

/// Hands out `token-1`, `token-2`, ... and counts calls
#[derive(Default)]
pub(crate) struct CountingExchange {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingExchange {
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for CountingExchange {
    async fn exchange(&self, _credentials: &OAuthCredentials) -> Result<AccessToken> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken::new(format!("token-{n}")))
    }
}

type Responder = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// Transport that records every request and answers from a closure
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responder: Responder,
}

impl RecordingTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Always answer 200 with `body`
    pub(crate) fn ok(body: &'static str) -> Self {
        Self::new(move |_| HttpResponse::new(StatusCode::OK, body))
    }

    /// Answer 401 unless the bearer token is one of `accepted`
    pub(crate) fn accepting(accepted: &'static [&'static str], body: &'static str) -> Self {
        Self::new(move |request| {
            let token = request
                .headers
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .unwrap_or_default();
            if accepted.contains(&token) {
                HttpResponse::new(StatusCode::OK, body)
            } else {
                HttpResponse::new(StatusCode::UNAUTHORIZED, "")
            }
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = (self.responder)(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(response)
    }
}
