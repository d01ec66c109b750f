//! # bioterm
//!
//! Client for biometric access-control terminals that expose a JSON
//! command API over HTTP(S).
//!
//! ## Features
//!
//! - One correlated request/response transaction per call, never retried
//! - Typed operations for users, enrollment, attendance and device settings
//! - Cursor pagination with a page budget
//! - Enrollment job polling with timeout and cancellation
//! - Async/await API using Tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use bioterm::{Device, EnrollKind};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> bioterm::Result<()> {
//!     let device = Device::new("192.168.1.201").with_api_key("secret");
//!
//!     // Device info
//!     let info = device.get_version_info().await?;
//!     println!("{}", info);
//!
//!     // Enroll a fingerprint and wait for the result
//!     let data = device
//!         .enroll(EnrollKind::Fingerprint, &CancellationToken::new())
//!         .await?;
//!     println!("Enrolled: {:?}", data);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod device;
pub mod error;
pub mod pagination;
pub mod poller;

// Re-exports
pub use client::Client;
pub use device::Device;
pub use error::{Error, Result};
pub use pagination::{Page, Paginator};
pub use poller::{JobHandle, JobPoller};

pub use bioterm_core::{Command, DeviceError, JobId, JobState, JobStatus, MessageId, Payload, Session};
pub use bioterm_transport::{HttpTransport, Request, Transport};

// Re-export types
pub use bioterm_types::{
    AttendLogPage, AttendLogRecord, CapacityLimit, CurrentUsage, Cursor, DeviceCapabilities,
    DeviceControlAction, DeviceId, DeviceTime, EnrollKind, NetworkConfig, PhotoConversion,
    Privilege, SecurityConfig, SoundVolume, TlsConfig, UploadInterval, UploaderConfig,
    UploaderStatus, UserIdPage, UserInfo, VerifyMode, VersionInfo,
};
