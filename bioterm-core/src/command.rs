//! Device protocol command names

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Protocol commands
///
/// Every command the control endpoint accepts. The wire name is the
/// `cmd` field of the request envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // Security
    SetSecurityConfig,

    // User management
    GetUserIdList,
    GetUserInfo,
    SetUserInfo,
    DeleteUserInfo,

    // Device control
    LockDevice,
    DeviceControl,

    // Enrollment jobs
    BeginEnrollFace,
    BeginEnrollFp,
    BeginEnrollCard,
    BeginEnrollPalm,
    QueryJobStatus,
    CancelJob,
    CancelAllJobs,
    PhotoToFacedata,

    // Attendance records
    GetAttendLog,
    EraseAttendLog,
    ConfigAttendLogUploader,
    GetAttendLogUploaderStatus,

    // Time
    GetDeviceTime,
    SetDeviceTime,

    // Network
    GetNetworkConfig,
    SetNetworkConfig,

    // Device information & settings
    GetVersionInfo,
    GetCapacityLimit,
    GetCurrentUsage,
    GetDeviceUid,
    GetDeviceCapabilities,
    GetDeviceId,
    SetDeviceId,
    GetSoundVolume,
    SetSoundVolume,
    GetVerifyMode,
    SetVerifyMode,
}

impl Command {
    /// All known commands
    pub const ALL: [Command; 34] = [
        Self::SetSecurityConfig,
        Self::GetUserIdList,
        Self::GetUserInfo,
        Self::SetUserInfo,
        Self::DeleteUserInfo,
        Self::LockDevice,
        Self::DeviceControl,
        Self::BeginEnrollFace,
        Self::BeginEnrollFp,
        Self::BeginEnrollCard,
        Self::BeginEnrollPalm,
        Self::QueryJobStatus,
        Self::CancelJob,
        Self::CancelAllJobs,
        Self::PhotoToFacedata,
        Self::GetAttendLog,
        Self::EraseAttendLog,
        Self::ConfigAttendLogUploader,
        Self::GetAttendLogUploaderStatus,
        Self::GetDeviceTime,
        Self::SetDeviceTime,
        Self::GetNetworkConfig,
        Self::SetNetworkConfig,
        Self::GetVersionInfo,
        Self::GetCapacityLimit,
        Self::GetCurrentUsage,
        Self::GetDeviceUid,
        Self::GetDeviceCapabilities,
        Self::GetDeviceId,
        Self::SetDeviceId,
        Self::GetSoundVolume,
        Self::SetSoundVolume,
        Self::GetVerifyMode,
        Self::SetVerifyMode,
    ];

    /// Check if this command changes device state
    pub fn is_mutating(self) -> bool {
        !self.name().starts_with("Get") && self != Self::QueryJobStatus
    }

    /// Get wire name
    pub fn name(self) -> &'static str {
        match self {
            Self::SetSecurityConfig => "SetSecurityConfig",
            Self::GetUserIdList => "GetUserIdList",
            Self::GetUserInfo => "GetUserInfo",
            Self::SetUserInfo => "SetUserInfo",
            Self::DeleteUserInfo => "DeleteUserInfo",
            Self::LockDevice => "LockDevice",
            Self::DeviceControl => "DeviceControl",
            Self::BeginEnrollFace => "BeginEnrollFace",
            Self::BeginEnrollFp => "BeginEnrollFp",
            Self::BeginEnrollCard => "BeginEnrollCard",
            Self::BeginEnrollPalm => "BeginEnrollPalm",
            Self::QueryJobStatus => "QueryJobStatus",
            Self::CancelJob => "CancelJob",
            Self::CancelAllJobs => "CancelAllJobs",
            Self::PhotoToFacedata => "PhotoToFacedata",
            Self::GetAttendLog => "GetAttendLog",
            Self::EraseAttendLog => "EraseAttendLog",
            Self::ConfigAttendLogUploader => "ConfigAttendLogUploader",
            Self::GetAttendLogUploaderStatus => "GetAttendLogUploaderStatus",
            Self::GetDeviceTime => "GetDeviceTime",
            Self::SetDeviceTime => "SetDeviceTime",
            Self::GetNetworkConfig => "GetNetworkConfig",
            Self::SetNetworkConfig => "SetNetworkConfig",
            Self::GetVersionInfo => "GetVersionInfo",
            Self::GetCapacityLimit => "GetCapacityLimit",
            Self::GetCurrentUsage => "GetCurrentUsage",
            Self::GetDeviceUid => "GetDeviceUid",
            Self::GetDeviceCapabilities => "GetDeviceCapabilities",
            Self::GetDeviceId => "GetDeviceId",
            Self::SetDeviceId => "SetDeviceId",
            Self::GetSoundVolume => "GetSoundVolume",
            Self::SetSoundVolume => "SetSoundVolume",
            Self::GetVerifyMode => "GetVerifyMode",
            Self::SetVerifyMode => "SetVerifyMode",
        }
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
