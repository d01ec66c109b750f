//! Attendance records and the automatic uploader

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// One attendance record
///
/// Record layout varies between firmware versions; all fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendLogRecord {
    pub fields: Map<String, Value>,
}

impl AttendLogRecord {
    /// Get a field by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field by name
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// One page of `GetAttendLog`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendLogPage {
    #[serde(default)]
    pub logs: Vec<AttendLogRecord>,

    /// Position of the first record in this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_pos: Option<Cursor>,

    /// Position of the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_pos: Option<Cursor>,
}

/// Upload interval for the attendance uploader, in seconds (5..=3600)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct UploadInterval(u32);

impl UploadInterval {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 3600;

    pub fn new(seconds: u32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&seconds) {
            return Err(Error::Validation(format!(
                "upload interval must be between {} and {} seconds, got {seconds}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for UploadInterval {
    type Error = Error;

    fn try_from(seconds: u32) -> Result<Self> {
        Self::new(seconds)
    }
}

impl From<UploadInterval> for u32 {
    fn from(interval: UploadInterval) -> u32 {
        interval.0
    }
}

/// `ConfigAttendLogUploader` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Service address records are pushed to
    pub target_uri: String,

    pub interval: UploadInterval,
}

impl UploaderConfig {
    pub fn new(target_uri: impl Into<String>, interval: UploadInterval) -> Self {
        Self {
            target_uri: target_uri.into(),
            interval,
        }
    }
}

/// `GetAttendLogUploaderStatus` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploaderStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Records not yet uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_count: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
