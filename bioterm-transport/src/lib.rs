//! Transport layer for the device control endpoint
//!
//! Provides HTTP/HTTPS delivery of encoded envelopes.

pub mod error;
pub mod http;

pub use error::{Error, Result};
pub use http::HttpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// One encoded request ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Encoded request envelope
    pub body: Bytes,

    /// API key to attach to the endpoint, if any
    pub api_key: Option<String>,

    /// Upper bound for the whole round trip
    pub timeout: Duration,
}

impl Request {
    pub fn new(body: Bytes, timeout: Duration) -> Self {
        Self {
            body,
            api_key: None,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// Transport trait for different delivery methods
///
/// Implementations must be safe for concurrent use: several transactions
/// may be in flight on one transport at the same time.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a request and return the raw response body
    async fn send(&self, request: Request) -> Result<Bytes>;

    /// Get the endpoint this transport talks to (without credentials)
    fn endpoint(&self) -> String;
}
