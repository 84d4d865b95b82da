//! In-process response cache
//!
//! Parsed payloads keyed by `"<METHOD> <full URL>"`. There is no TTL, no
//! eviction and no size bound: entries live as long as the client. Which
//! requests may be cached is decided by the dispatcher, not here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Method;

use crate::types::Payload;

/// Memoized response payloads
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Payload>>,
}

impl ResponseCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a request
    #[must_use]
    pub fn key(method: &Method, url: &str) -> String {
        format!("{method} {url}")
    }

    /// Look up a stored payload
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Payload> {
        self.entries().get(key).cloned()
    }

    /// Store a payload, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, payload: Payload) {
        self.entries().insert(key.into(), payload);
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Inserts are single map operations, so a poisoned map is still consistent
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Payload>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
