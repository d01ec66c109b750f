//! High-level error types

use std::time::Duration;

use bioterm_core::{DeviceError, JobId, MessageId, Payload};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, timeout or TLS failure; never retried
    #[error("Transport error: {0}")]
    Transport(#[from] bioterm_transport::Error),

    /// Response body could not be understood
    #[error("Protocol error: {0}")]
    Protocol(#[from] bioterm_core::Error),

    /// Response carried a different correlation id than the request
    #[error("Correlation mismatch: sent mid {expected}, response carried {actual}")]
    CorrelationMismatch {
        expected: MessageId,
        actual: MessageId,
    },

    /// Application error reported by the device
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Device reported the job as failed
    #[error("Job {job_id} failed")]
    JobFailed {
        job_id: JobId,
        details: Payload,
    },

    /// Job still pending when the wait budget ran out
    #[error("Job {job_id} still pending after {elapsed:?}")]
    JobTimeout {
        job_id: JobId,
        elapsed: Duration,
    },

    /// Device reported a job state outside pending/succeeded/failed
    #[error("Job {job_id} reported unknown state: {state}")]
    UnknownJobState {
        job_id: JobId,
        state: String,
    },

    /// Wait abandoned by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Listing did not terminate within the page budget
    #[error("Listing not finished after {limit} pages")]
    PageLimitExceeded {
        limit: usize,
    },

    /// Argument rejected before anything was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] bioterm_types::Error),
}

impl Error {
    /// Check if the error means the response cannot be trusted
    pub fn is_integrity_fault(&self) -> bool {
        match self {
            Self::CorrelationMismatch { .. } | Self::UnknownJobState { .. } => true,
            Self::Protocol(e) => e.is_protocol_violation(),
            _ => false,
        }
    }

    /// Get the device error code, if the device reported one
    pub fn device_code(&self) -> Option<&str> {
        match self {
            Self::Device(e) => Some(&e.code),
            _ => None,
        }
    }

    /// Check if this is one of the enrollment job outcomes
    pub fn is_job_error(&self) -> bool {
        matches!(
            self,
            Self::JobFailed { .. } | Self::JobTimeout { .. } | Self::UnknownJobState { .. }
        )
    }
}
