//! Request/response envelopes and their JSON encoding

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::{
    constants::fields,
    device_error::{DeviceError, ErrorPayload},
    error::{Error, Result},
    message_id::MessageId,
};

/// Structured key-value body of a request or successful response
pub type Payload = Map<String, Value>;

/// Request envelope
///
/// # Wire format
///
/// ```text
/// { "mid": "<8 chars>", "cmd": "<command>", "payload": { ... } }
/// ```
///
/// # Examples
///
/// ```
/// use bioterm_core::{Command, MessageId, Payload, RequestEnvelope};
///
/// let request = RequestEnvelope::new(MessageId::generate(), Command::GetDeviceTime, Payload::new());
/// let encoded = request.encode().unwrap();
///
/// let decoded = RequestEnvelope::decode(&encoded).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Correlation id
    pub mid: MessageId,

    /// Command name
    pub cmd: String,

    /// Command-specific parameters
    #[serde(default)]
    pub payload: Payload,
}

impl RequestEnvelope {
    /// Create a request envelope
    pub fn new(mid: MessageId, command: impl AsRef<str>, payload: Payload) -> Self {
        Self {
            mid,
            cmd: command.as_ref().to_string(),
            payload,
        }
    }

    /// Encode to JSON bytes
    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Decode a request from JSON bytes
    ///
    /// Used on the device side of the protocol (simulators, tests).
    pub fn decode(buf: &[u8]) -> Result<Self> {
        serde_json::from_slice(buf).map_err(|e| Error::MalformedResponse(e.to_string()))
    }
}

impl fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("mid", &self.mid.as_str())
            .field("cmd", &self.cmd)
            .field("payload_keys", &self.payload.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Encode a command with a freshly generated correlation id
///
/// The id is returned alongside the bytes; the caller needs it to
/// correlate the response.
pub fn encode(command: impl AsRef<str>, payload: Payload) -> Result<(MessageId, Bytes)> {
    let mid = MessageId::generate();
    let bytes = RequestEnvelope::new(mid.clone(), command, payload).encode()?;
    Ok((mid, bytes))
}

/// Outcome marker of a response (`result` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    /// Get wire name
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "Success" => Some(Self::Success),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of a response, by outcome
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Success(Payload),
    Error(ErrorPayload),
}

/// Response envelope
///
/// # Wire format
///
/// ```text
/// { "mid": "<echoed id>", "result": "Success" | "Error", "payload": { ... } }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// Correlation id echoed by the device
    pub mid: MessageId,

    /// Payload or error object
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    /// Create a successful response
    pub fn success(mid: MessageId, payload: Payload) -> Self {
        Self {
            mid,
            body: ResponseBody::Success(payload),
        }
    }

    /// Create an error response
    pub fn error(mid: MessageId, error: ErrorPayload) -> Self {
        Self {
            mid,
            body: ResponseBody::Error(error),
        }
    }

    /// Get the outcome marker
    pub fn result(&self) -> Outcome {
        match self.body {
            ResponseBody::Success(_) => Outcome::Success,
            ResponseBody::Error(_) => Outcome::Error,
        }
    }

    /// Split into the payload or the mapped device error
    pub fn into_result(self) -> std::result::Result<Payload, DeviceError> {
        match self.body {
            ResponseBody::Success(payload) => Ok(payload),
            ResponseBody::Error(error) => Err(error.map()),
        }
    }

    /// Decode a response from JSON bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if:
    /// - The bytes are not a JSON object
    /// - `mid` is missing
    /// - `result` is missing or not a string
    /// - `result` is neither `Success` nor `Error`
    /// - A successful response carries a non-object payload
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_core::{Outcome, ResponseEnvelope};
    ///
    /// let raw = br#"{"mid":"0a1b2c3d","result":"Success","payload":{"time":"2024-01-01T08:00:00"}}"#;
    /// let response = ResponseEnvelope::decode(raw).unwrap();
    ///
    /// assert_eq!(response.mid.as_str(), "0a1b2c3d");
    /// assert_eq!(response.result(), Outcome::Success);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(buf)
            .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {e}")))?;

        let Value::Object(mut object) = value else {
            return Err(Error::MalformedResponse("envelope is not an object".into()));
        };

        // Any echoed value is kept so the caller can report it as a mismatch
        let mid = match object.remove(fields::MID) {
            Some(Value::String(mid)) => MessageId::echoed(mid),
            Some(other) => {
                trace!(mid = %other, "Non-string correlation id in response");
                MessageId::echoed(other.to_string())
            }
            None => {
                warn!("Response without correlation id");
                return Err(missing(fields::MID));
            }
        };

        let outcome = match object.remove(fields::RESULT) {
            Some(Value::String(result)) => Outcome::parse(&result).ok_or_else(|| {
                Error::MalformedResponse(format!("unknown `{}`: {result:?}", fields::RESULT))
            })?,
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "`{}` is not a string: {other}",
                    fields::RESULT
                )));
            }
            None => return Err(missing(fields::RESULT)),
        };

        let payload = object.remove(fields::PAYLOAD).unwrap_or(Value::Null);

        let body = match outcome {
            Outcome::Success => match payload {
                Value::Object(map) => ResponseBody::Success(map),
                Value::Null => ResponseBody::Success(Payload::new()),
                other => {
                    return Err(Error::MalformedResponse(format!(
                        "`{}` is not an object: {other}",
                        fields::PAYLOAD
                    )));
                }
            },
            Outcome::Error => ResponseBody::Error(ErrorPayload::from_value(&payload)),
        };

        let response = Self { mid, body };
        trace!(%response, "Decoded response");
        Ok(response)
    }

    /// Encode to JSON bytes
    ///
    /// Used on the device side of the protocol (simulators, tests).
    pub fn encode(&self) -> Result<Bytes> {
        let payload = match &self.body {
            ResponseBody::Success(payload) => Value::Object(payload.clone()),
            ResponseBody::Error(error) => serde_json::to_value(error)?,
        };

        let mut object = Map::new();
        object.insert(fields::MID.into(), Value::String(self.mid.to_string()));
        object.insert(fields::RESULT.into(), Value::String(self.result().name().into()));
        object.insert(fields::PAYLOAD.into(), payload);

        Ok(Bytes::from(serde_json::to_vec(&Value::Object(object))?))
    }
}

impl fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response[{}](mid={})", self.result(), self.mid)
    }
}

fn missing(field: &str) -> Error {
    Error::MalformedResponse(format!("missing `{field}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn mid(s: &str) -> MessageId {
        s.parse().unwrap()
    }

    #[test]
    fn test_request_wire_format() {
        let mut payload = Payload::new();
        payload.insert("id".into(), json!("999"));

        let request = RequestEnvelope::new(mid("abcd1234"), Command::GetUserInfo, payload);
        let encoded = request.encode().unwrap();
        let value: Value = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(
            value,
            json!({"mid": "abcd1234", "cmd": "GetUserInfo", "payload": {"id": "999"}})
        );
    }

    #[test]
    fn test_encode_generates_id() {
        let (mid, bytes) = encode(Command::CancelAllJobs, Payload::new()).unwrap();
        let request = RequestEnvelope::decode(&bytes).unwrap();

        assert_eq!(request.mid, mid);
        assert_eq!(request.cmd, "CancelAllJobs");
        assert!(request.payload.is_empty());
    }

    #[test]
    fn test_decode_success() {
        let raw = br#"{"mid":"abcd1234","result":"Success","payload":{"volume":5}}"#;
        let response = ResponseEnvelope::decode(raw).unwrap();

        assert_eq!(response.mid, mid("abcd1234"));
        assert_eq!(response.result(), Outcome::Success);

        let payload = response.into_result().unwrap();
        assert_eq!(payload.get("volume"), Some(&json!(5)));
    }

    #[test]
    fn test_decode_success_without_payload() {
        let raw = br#"{"mid":"abcd1234","result":"Success"}"#;
        let payload = ResponseEnvelope::decode(raw).unwrap().into_result().unwrap();
        assert!(payload.is_empty());

        let raw = br#"{"mid":"abcd1234","result":"Success","payload":null}"#;
        let payload = ResponseEnvelope::decode(raw).unwrap().into_result().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_error() {
        let raw = br#"{"mid":"abcd1234","result":"Error","payload":{"code":"dup_id","arguments":["42"]}}"#;
        let response = ResponseEnvelope::decode(raw).unwrap();
        assert_eq!(response.result(), Outcome::Error);

        let err = response.into_result().unwrap_err();
        assert_eq!(err.code, "dup_id");
        assert_eq!(err.arguments, vec![json!("42")]);
    }

    #[test]
    fn test_decode_error_without_payload() {
        let raw = br#"{"mid":"abcd1234","result":"Error"}"#;
        let err = ResponseEnvelope::decode(raw).unwrap().into_result().unwrap_err();
        assert_eq!(err, DeviceError::new("unknown_error"));
    }

    #[test]
    fn test_decode_not_json() {
        let result = ResponseEnvelope::decode(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_not_object() {
        let result = ResponseEnvelope::decode(b"[1,2,3]");
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_decode_missing_fields() {
        let no_mid = br#"{"result":"Success","payload":{}}"#;
        assert!(matches!(ResponseEnvelope::decode(no_mid), Err(Error::MalformedResponse(m)) if m.contains("mid")));

        let no_result = br#"{"mid":"abcd1234","payload":{}}"#;
        assert!(matches!(ResponseEnvelope::decode(no_result), Err(Error::MalformedResponse(m)) if m.contains("result")));
    }

    #[test]
    fn test_decode_bad_field_types() {
        for raw in [
            &br#"{"mid":"abcd1234","result":true}"#[..],
            br#"{"mid":"abcd1234","result":"Maybe"}"#,
            br#"{"mid":"abcd1234","result":"Success","payload":"ok"}"#,
        ] {
            assert!(
                matches!(ResponseEnvelope::decode(raw), Err(Error::MalformedResponse(_))),
                "accepted {}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn test_decode_keeps_any_echoed_mid() {
        let cases = [
            (&br#"{"mid":"","result":"Success"}"#[..], ""),
            (br#"{"mid":12345678,"result":"Success"}"#, "12345678"),
            (br#"{"mid":null,"result":"Success"}"#, "null"),
        ];
        for (raw, expected) in cases {
            let response = ResponseEnvelope::decode(raw).unwrap();
            assert_eq!(response.mid.as_str(), expected);
        }
    }

    #[test]
    fn test_response_encode_decode() {
        let mut payload = Payload::new();
        payload.insert("job_id".into(), json!(7));
        let original = ResponseEnvelope::success(mid("0badf00d"), payload);

        let decoded = ResponseEnvelope::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(original, decoded);

        let original = ResponseEnvelope::error(
            mid("0badf00d"),
            ErrorPayload {
                code: Some(json!("busy")),
                arguments: Some(json!([])),
            },
        );
        let decoded = ResponseEnvelope::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded.into_result().unwrap_err(), DeviceError::new("busy"));
    }

    proptest! {
        #[test]
        fn prop_response_payload_survives(key in "[a-z_]{1,12}", text in "[ -~]{0,32}", number in any::<i64>()) {
            let (mid, _) = encode(Command::GetVersionInfo, Payload::new()).unwrap();

            let mut payload = Payload::new();
            payload.insert(key.clone(), json!(text));
            payload.insert(format!("{key}_n"), json!(number));

            let raw = serde_json::to_vec(&json!({"mid": mid.as_str(), "result": "Success", "payload": payload})).unwrap();
            let response = ResponseEnvelope::decode(&raw).unwrap();

            prop_assert_eq!(&response.mid, &mid);
            prop_assert_eq!(response.into_result().unwrap(), payload);
        }
    }
}
