//! Device settings with bounded values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

macro_rules! bounded_setting {
    ($(#[$meta:meta])* $name:ident, $label:literal, $min:literal..=$max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u16", into = "u16")]
        pub struct $name(u8);

        impl $name {
            pub const MIN: u8 = $min;
            pub const MAX: u8 = $max;

            #[allow(unused_comparisons)]
            pub fn new(value: u16) -> Result<Self> {
                if value < Self::MIN as u16 || value > Self::MAX as u16 {
                    return Err(Error::Validation(format!(
                        concat!($label, " must be between {} and {}, got {}"),
                        Self::MIN,
                        Self::MAX,
                        value
                    )));
                }
                Ok(Self(value as u8))
            }

            pub fn get(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<u16> for $name {
            type Error = Error;

            fn try_from(value: u16) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> u16 {
                value.0 as u16
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_setting!(
    /// Device number on the site network (1..=255)
    DeviceId, "device id", 1..=255
);

bounded_setting!(
    /// Speaker volume (1..=10)
    SoundVolume, "sound volume", 1..=10
);

bounded_setting!(
    /// Verification mode (0..=15), a device-defined combination of factors
    VerifyMode, "verify mode", 0..=15
);

/// Bulk-clear actions of `DeviceControl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceControlAction {
    ClearAttendLog,
    ClearAdminLog,
    ClearUsers,
    ClearAdmins,
    ClearAllData,
}

impl DeviceControlAction {
    pub const ALL: [DeviceControlAction; 5] = [
        Self::ClearAttendLog,
        Self::ClearAdminLog,
        Self::ClearUsers,
        Self::ClearAdmins,
        Self::ClearAllData,
    ];

    /// Get wire name
    pub fn name(self) -> &'static str {
        match self {
            Self::ClearAttendLog => "ClearAttendLog",
            Self::ClearAdminLog => "ClearAdminLog",
            Self::ClearUsers => "ClearUsers",
            Self::ClearAdmins => "ClearAdmins",
            Self::ClearAllData => "ClearAllData",
        }
    }
}

impl std::str::FromStr for DeviceControlAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|a| a.name()).collect();
                Error::Validation(format!("invalid action {s:?}, must be one of: {}", valid.join(", ")))
            })
    }
}

impl fmt::Display for DeviceControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
