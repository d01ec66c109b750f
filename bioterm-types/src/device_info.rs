//! Device information structures

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// `GetVersionInfo` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Firmware version
    #[serde(default)]
    pub firmware_version: String,

    /// Face recognition algorithm version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_algorithm_version: Option<String>,

    /// Fingerprint algorithm version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp_algorithm_version: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[FW: {}, Face: {}, FP: {}]",
            self.firmware_version,
            self.face_algorithm_version.as_deref().unwrap_or("N/A"),
            self.fp_algorithm_version.as_deref().unwrap_or("N/A")
        )
    }
}

/// `GetCapacityLimit` response: maximum count per record kind
pub type CapacityLimit = BTreeMap<String, u64>;

/// `GetCurrentUsage` response: current count per record kind
pub type CurrentUsage = BTreeMap<String, u64>;

/// `GetDeviceCapabilities` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceCapabilities(pub BTreeMap<String, bool>);

impl DeviceCapabilities {
    /// Check if a feature is reported and enabled
    pub fn supports(&self, feature: &str) -> bool {
        self.0.get(feature).copied().unwrap_or(false)
    }

    /// Names of all enabled features
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, on)| **on).map(|(name, _)| name.as_str())
    }
}

/// Device clock reading (`time` field of `GetDeviceTime` / `SetDeviceTime`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTime {
    /// ISO-8601 text exactly as the device reported it
    pub time: String,
}

impl DeviceTime {
    /// Wrap a local timestamp in the format the device accepts
    pub fn from_naive(time: NaiveDateTime) -> Self {
        Self {
            time: time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Parse the reported time
    ///
    /// Accepts RFC 3339 (offset dropped, wall-clock kept) and naive ISO-8601
    /// with or without fractional seconds.
    pub fn parse(&self) -> Result<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.time) {
            return Ok(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| Error::Parse(format!("device time {:?}: {e}", self.time)))
    }
}

impl fmt::Display for DeviceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.time)
    }
}
