//! # bioterm-core
//!
//! Core protocol implementation for HTTP/JSON biometric terminals.
//!
//! This crate provides the low-level protocol primitives:
//! - Request/response envelopes and their JSON encoding
//! - Mapping of device-reported errors
//! - Command names
//! - Correlation ids and session state
//! - Job state parsing
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod device_error;
pub mod envelope;
pub mod error;
pub mod job;
pub mod message_id;
pub mod session;

pub use command::Command;
pub use device_error::{DeviceError, ErrorPayload};
pub use envelope::{encode, Outcome, Payload, RequestEnvelope, ResponseBody, ResponseEnvelope};
pub use error::{Error, Result};
pub use job::{JobId, JobState, JobStatus};
pub use message_id::MessageId;
pub use session::{MessageIdGuard, Session};
