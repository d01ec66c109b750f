//! Correlation ids
//!
//! Every request envelope carries a short random `mid` that the device
//! echoes back in its response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MESSAGE_ID_LEN;
use crate::error::{Error, Result};

/// Correlation id of one request/response pair
///
/// Generated ids are 8 lowercase hex characters. Ids parsed from a response
/// are kept verbatim, whatever the device sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a new random id
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_core::MessageId;
    ///
    /// let mid = MessageId::generate();
    /// assert_eq!(mid.as_str().len(), 8);
    /// ```
    pub fn generate() -> Self {
        let bytes: [u8; MESSAGE_ID_LEN / 2] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Wrap an id echoed by a device, verbatim
    pub(crate) fn echoed(mid: impl Into<String>) -> Self {
        Self(mid.into())
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MessageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.chars().any(char::is_control) {
            return Err(Error::InvalidMessageId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
