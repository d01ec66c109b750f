//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("TLS failure: {0}")]
    Tls(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl Error {
    /// Check if the request may never have reached the device
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Tls(_) | Self::InvalidEndpoint(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = err.status() {
            return Self::Status(status.as_u16());
        }
        if err.is_connect() {
            // rustls reports certificate problems as connect errors
            let detail = error_chain(&err);
            if detail.contains("certificate") || detail.to_ascii_lowercase().contains("tls") {
                return Self::Tls(detail);
            }
            return Self::Connect(detail);
        }
        if err.is_builder() {
            return Self::InvalidEndpoint(err.to_string());
        }
        Self::Http(err)
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
