//! Security configuration

use serde::{Deserialize, Serialize};

use crate::serde_util::yes_no;

/// TLS section of the security configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Serve the HTTPS interface
    #[serde(with = "yes_no")]
    pub enabled: bool,

    /// Validate peer certificates
    #[serde(with = "yes_no")]
    pub validate_certificate: bool,

    /// PEM-encoded CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,

    /// PEM-encoded device certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_cert: Option<String>,

    /// PEM-encoded device private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_key: Option<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            validate_certificate: true,
            ca_cert: None,
            device_cert: None,
            device_key: None,
        }
    }
}

/// `SetSecurityConfig` request
///
/// # Examples
///
/// ```
/// use bioterm_types::SecurityConfig;
///
/// let config = SecurityConfig::new().api_key("k2").enable_https(true);
/// let json = serde_json::to_value(&config).unwrap();
///
/// assert_eq!(json["enable_http"], "yes");
/// assert_eq!(json["tls_conf"]["enabled"], "yes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// New API key; `None` leaves the current key in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Serve the plain HTTP interface
    #[serde(with = "yes_no")]
    pub enable_http: bool,

    pub tls_conf: TlsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            enable_http: true,
            tls_conf: TlsConfig::default(),
        }
    }
}

impl SecurityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn enable_http(mut self, enabled: bool) -> Self {
        self.enable_http = enabled;
        self
    }

    pub fn enable_https(mut self, enabled: bool) -> Self {
        self.tls_conf.enabled = enabled;
        self
    }

    pub fn validate_certificate(mut self, validate: bool) -> Self {
        self.tls_conf.validate_certificate = validate;
        self
    }

    pub fn ca_cert(mut self, pem: impl Into<String>) -> Self {
        self.tls_conf.ca_cert = Some(pem.into());
        self
    }

    pub fn device_cert(mut self, pem: impl Into<String>) -> Self {
        self.tls_conf.device_cert = Some(pem.into());
        self
    }

    pub fn device_key(mut self, pem: impl Into<String>) -> Self {
        self.tls_conf.device_key = Some(pem.into());
        self
    }
}
