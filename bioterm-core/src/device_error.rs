//! Mapping of device-reported errors
//!
//! Firmware versions disagree on how much of the error object they fill in,
//! so mapping never fails: a missing code becomes `unknown_error` and missing
//! arguments become an empty list.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{fields, UNKNOWN_ERROR_CODE};

/// Error object as found in the `payload` of an `Error` response
///
/// Fields are kept loose; [`ErrorPayload::map`] turns them into a [`DeviceError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl ErrorPayload {
    /// Extract the error fields from a raw `payload` value
    ///
    /// Anything that is not an object yields an empty payload.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                code: map.get(fields::CODE).cloned(),
                arguments: map.get(fields::ARGUMENTS).cloned(),
            },
            _ => Self::default(),
        }
    }

    /// Map to a typed device error
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_core::ErrorPayload;
    /// use serde_json::json;
    ///
    /// let err = ErrorPayload::from_value(&json!({"code": "dup_id", "arguments": ["42"]})).map();
    /// assert_eq!(err.code, "dup_id");
    /// assert_eq!(err.arguments, vec![json!("42")]);
    /// ```
    pub fn map(self) -> DeviceError {
        let code = match self.code {
            None | Some(Value::Null) => UNKNOWN_ERROR_CODE.to_string(),
            Some(Value::String(code)) => code,
            Some(other) => other.to_string(),
        };

        let arguments = match self.arguments {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(args)) => args,
            Some(single) => vec![single],
        };

        DeviceError { code, arguments }
    }
}

/// Application error reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// Device-defined error kind (e.g. `dup_id`)
    pub code: String,

    /// Auxiliary values, in the order the device sent them
    pub arguments: Vec<Value>,
}

impl DeviceError {
    /// Create a device error with the given code and no arguments
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            arguments: Vec::new(),
        }
    }

    /// Check if the device omitted the error code
    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_ERROR_CODE
    }

    /// Get an argument rendered as a string
    pub fn argument_str(&self, index: usize) -> Option<String> {
        self.arguments.get(index).map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device error: {}", self.code)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(Value::to_string).collect();
            write!(f, " ({})", args.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for DeviceError {}

impl From<ErrorPayload> for DeviceError {
    fn from(payload: ErrorPayload) -> Self {
        payload.map()
    }
}
