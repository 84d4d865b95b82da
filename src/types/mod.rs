//! Type definitions for the Data API client
//!
//! Request options, request bodies and response payloads.

pub mod body;
pub mod options;

pub use body::{Body, Payload};
pub use options::{RequestOptions, RequestOptionsBuilder};
