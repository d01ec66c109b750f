//! Error types for bioterm-core

/// Result type alias for bioterm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Response bytes are not a valid envelope
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Command name is not part of the device protocol
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Job state outside `pending` / `succeeded` / `failed`
    #[error("Unknown job state: {}", state.as_deref().unwrap_or("<missing>"))]
    UnknownJobState {
        state: Option<String>,
    },

    /// Correlation id that cannot be used on the wire
    #[error("Invalid message id: {0:?}")]
    InvalidMessageId(String),
}

impl Error {
    /// Check if the error means the peer sent something we cannot parse
    ///
    /// These point at a codec or firmware mismatch rather than a transient fault.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse(_) | Self::Json(_) | Self::UnknownJobState { .. }
        )
    }
}
