//! Biometric enrollment

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credential captured by an enrollment job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollKind {
    Face,
    Fingerprint,
    Card,
    Palm,
}

impl EnrollKind {
    pub const ALL: [EnrollKind; 4] = [Self::Face, Self::Fingerprint, Self::Card, Self::Palm];
}

impl fmt::Display for EnrollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Face => "face",
            Self::Fingerprint => "fingerprint",
            Self::Card => "card",
            Self::Palm => "palm",
        };
        f.write_str(name)
    }
}

/// `PhotoToFacedata` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoConversion {
    /// Base64 face template, present when the conversion succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_data: Option<String>,

    /// Conversion status and any other reported fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoConversion {
    pub fn is_success(&self) -> bool {
        self.face_data.is_some()
    }
}
