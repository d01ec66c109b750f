//! Client-side session state
//!
//! The control endpoint is stateless, so a session only tracks:
//! - The cached API key (sent with every request)
//! - Correlation ids of requests still awaiting a response

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::message_id::MessageId;

/// Session manager
///
/// Thread-safe and can be cloned cheaply (Arc internally). Clones share
/// the same API key and in-flight set.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug, Default)]
struct SessionInner {
    /// API key appended to the endpoint URL
    api_key: RwLock<Option<String>>,

    /// Ids of outstanding requests
    in_flight: Mutex<HashSet<MessageId>>,
}

impl Session {
    /// Create a session without an API key
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_api_key(Some(api_key.into()));
        session
    }

    /// Get the cached API key
    pub fn api_key(&self) -> Option<String> {
        self.inner.api_key.read().clone()
    }

    /// Replace the cached API key
    ///
    /// Only call this after the device has accepted the new key.
    pub fn set_api_key(&self, api_key: Option<String>) {
        *self.inner.api_key.write() = api_key;
    }

    /// Reserve a correlation id for a new request
    ///
    /// The id is unique among this session's outstanding requests until the
    /// returned guard is dropped.
    pub fn reserve_message_id(&self) -> MessageIdGuard {
        let mut in_flight = self.inner.in_flight.lock();

        let mid = loop {
            let candidate = MessageId::generate();
            if !in_flight.contains(&candidate) {
                break candidate;
            }
        };

        in_flight.insert(mid.clone());

        MessageIdGuard {
            session: self.clone(),
            mid,
        }
    }

    /// Number of requests currently awaiting a response
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    fn release(&self, mid: &MessageId) {
        self.inner.in_flight.lock().remove(mid);
    }
}

/// Reservation of an in-flight correlation id
///
/// Releases the id when dropped.
#[derive(Debug)]
pub struct MessageIdGuard {
    session: Session,
    mid: MessageId,
}

impl MessageIdGuard {
    /// The reserved id
    pub fn id(&self) -> &MessageId {
        &self.mid
    }
}

impl Drop for MessageIdGuard {
    fn drop(&mut self) {
        self.session.release(&self.mid);
    }
}
