//! Protocol client: one correlated request/response transaction per call

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use bioterm_core::constants::DEFAULT_TIMEOUT;
use bioterm_core::{Command, Payload, RequestEnvelope, ResponseEnvelope, Session};
use bioterm_transport::{Request, Transport};

use crate::error::{Error, Result};

/// Protocol client
///
/// Each [`transact`](Client::transact) call is independent: it generates a
/// fresh correlation id, sends one request, validates the response and
/// returns the payload or exactly one typed error. Nothing is retried.
///
/// The client adds no locking of its own; concurrent calls are safe as long
/// as the transport is (the HTTP transport is).
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    session: Session,
    timeout: Duration,
}

impl Client {
    /// Create a client over the given transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a client over a transport shared with other clients
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set per-transaction timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use an existing session (shares its API key)
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Get the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get per-transaction timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the endpoint of the underlying transport
    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    /// Run one request/response transaction
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`]: delivery failed or exceeded the timeout
    /// - [`Error::Protocol`]: the response is not a valid envelope
    /// - [`Error::CorrelationMismatch`]: the response answers another request
    /// - [`Error::Device`]: the device reported an application error
    pub async fn transact(&self, command: impl AsRef<str>, payload: Payload) -> Result<Payload> {
        let command = command.as_ref();

        // Held until the response is validated
        let reservation = self.session.reserve_message_id();
        let mid = reservation.id().clone();

        let body = RequestEnvelope::new(mid.clone(), command, payload).encode()?;
        let request = Request::new(body, self.timeout).with_api_key(self.session.api_key());

        // Unknown (raw) commands are assumed to change state
        let mutating = command.parse::<Command>().map_or(true, Command::is_mutating);
        debug!(%mid, command, mutating, "Sending request");

        let raw = match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(result) => result.map_err(|e| {
                warn!(%mid, command, error = %e, "Transport failure");
                Error::Transport(e)
            })?,
            Err(_) => {
                warn!(%mid, command, timeout = ?self.timeout, "Request timed out");
                return Err(Error::Transport(bioterm_transport::Error::Timeout));
            }
        };

        let response = ResponseEnvelope::decode(&raw).map_err(|e| {
            warn!(%mid, command, error = %e, "Malformed response");
            Error::Protocol(e)
        })?;

        trace!(%mid, "Received: {}", response);

        if response.mid != mid {
            warn!(expected = %mid, actual = %response.mid, command, "Correlation id mismatch");
            return Err(Error::CorrelationMismatch {
                expected: mid,
                actual: response.mid,
            });
        }

        match response.into_result() {
            Ok(payload) => {
                debug!(%mid, command, "Request succeeded");
                Ok(payload)
            }
            Err(device_error) => {
                debug!(%mid, command, code = %device_error.code, "Device returned error");
                Err(Error::Device(device_error))
            }
        }
    }

    /// Run a transaction with a typed request and response
    pub async fn call<Req, Resp>(&self, command: impl AsRef<str>, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let command = command.as_ref();
        let payload = self.transact(command, to_payload(request)?).await?;
        from_payload(command, payload)
    }
}

/// Serialize a typed request into a payload object
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Payload> {
    match serde_json::to_value(value).map_err(bioterm_core::Error::Json)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Payload::new()),
        other => Err(bioterm_core::Error::MalformedResponse(format!(
            "request body must be an object, got {other}"
        ))
        .into()),
    }
}

/// Deserialize a response payload into its typed form
pub fn from_payload<T: DeserializeOwned>(command: &str, payload: Payload) -> Result<T> {
    serde_json::from_value(Value::Object(payload)).map_err(|e| {
        warn!(command, error = %e, "Unexpected response payload");
        bioterm_core::Error::MalformedResponse(format!("{command} payload: {e}")).into()
    })
}
