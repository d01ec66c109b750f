//! Type definitions for bioterm
//!
//! Typed request and response bodies for the device operations. Every type
//! serializes to exactly the JSON object the device expects in `payload`.

pub mod attendance;
pub mod cursor;
pub mod device_info;
pub mod enroll;
pub mod error;
pub mod network;
pub mod security;
pub mod serde_util;
pub mod settings;
pub mod user;

pub use attendance::{AttendLogPage, AttendLogRecord, UploadInterval, UploaderConfig, UploaderStatus};
pub use cursor::Cursor;
pub use device_info::{CapacityLimit, CurrentUsage, DeviceCapabilities, DeviceTime, VersionInfo};
pub use enroll::{EnrollKind, PhotoConversion};
pub use error::{Error, Result};
pub use network::NetworkConfig;
pub use security::{SecurityConfig, TlsConfig};
pub use settings::{DeviceControlAction, DeviceId, SoundVolume, VerifyMode};
pub use user::{Privilege, UserIdPage, UserInfo};
