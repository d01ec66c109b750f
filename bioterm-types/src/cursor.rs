//! Pagination cursors

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque position in a paged listing
///
/// Devices use integer positions for both user and attendance listings,
/// but the cursor is passed back verbatim so string tokens and any other
/// value a device invents (such as a float position) work too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    Position(i64),
    Token(String),
    Other(Value),
}

impl From<i64> for Cursor {
    fn from(pos: i64) -> Self {
        Self::Position(pos)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<Cursor> for Value {
    fn from(cursor: Cursor) -> Self {
        match cursor {
            Cursor::Position(pos) => Value::from(pos),
            Cursor::Token(token) => Value::String(token),
            Cursor::Other(value) => value,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(pos) => write!(f, "{pos}"),
            Self::Token(token) => f.write_str(token),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}
