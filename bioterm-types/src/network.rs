//! Network configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GetNetworkConfig` / `SetNetworkConfig` body
///
/// Interface sections are passed through untouched; a section left as
/// `None` is omitted and keeps its current device-side value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethernet: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wlan: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ethernet(mut self, section: Map<String, Value>) -> Self {
        self.ethernet = Some(section);
        self
    }

    pub fn wlan(mut self, section: Map<String, Value>) -> Self {
        self.wlan = Some(section);
        self
    }
}
