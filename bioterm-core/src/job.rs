//! Asynchronous job states
//!
//! Enrollment commands start a device-side job and return its id. The job
//! is then observed through `QueryJobStatus`:
//!
//! ```text
//!            ┌──────────► Succeeded
//!  Pending ──┤
//!            └──────────► Failed
//! ```
//!
//! `Succeeded` and `Failed` are terminal.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    constants::{fields, job_states},
    envelope::Payload,
    error::{Error, Result},
};

/// Device-assigned job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    /// Read the `job_id` field of a `Begin*` response
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        payload
            .get(fields::JOB_ID)
            .and_then(Value::as_i64)
            .map(Self)
            .ok_or_else(|| {
                Error::MalformedResponse(format!("missing integer `{}`", fields::JOB_ID))
            })
    }

    /// Build the `{ "job_id": .. }` payload used by job commands
    pub fn to_payload(self) -> Payload {
        let mut payload = Payload::new();
        payload.insert(fields::JOB_ID.into(), Value::from(self.0));
        payload
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Pending,
    Succeeded,
    Failed,
}

impl JobState {
    /// Check if no further transition can happen
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Get wire name
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => job_states::PENDING,
            Self::Succeeded => job_states::SUCCEEDED,
            Self::Failed => job_states::FAILED,
        }
    }

    /// Parse a wire name
    ///
    /// Anything other than the three known names is rejected, never coerced.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            job_states::PENDING => Ok(Self::Pending),
            job_states::SUCCEEDED => Ok(Self::Succeeded),
            job_states::FAILED => Ok(Self::Failed),
            other => Err(Error::UnknownJobState {
                state: Some(other.to_string()),
            }),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one `QueryJobStatus` call
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: JobState,

    /// Completion data: every field of the status payload except `state`
    ///
    /// Only meaningful once the job has succeeded.
    pub data: Payload,
}

impl JobStatus {
    /// Parse a `QueryJobStatus` payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownJobState`] if `state` is missing, not a string,
    /// or not one of `pending`, `succeeded`, `failed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioterm_core::{JobState, JobStatus};
    /// use serde_json::json;
    ///
    /// let payload = json!({"state": "succeeded", "face_data": "AAEC"});
    /// let status = JobStatus::from_payload(payload.as_object().unwrap().clone()).unwrap();
    ///
    /// assert_eq!(status.state, JobState::Succeeded);
    /// assert_eq!(status.data.get("face_data"), Some(&json!("AAEC")));
    /// ```
    pub fn from_payload(mut payload: Payload) -> Result<Self> {
        let state = match payload.remove(fields::STATE) {
            Some(Value::String(state)) => JobState::parse(&state)?,
            Some(other) => {
                return Err(Error::UnknownJobState {
                    state: Some(other.to_string()),
                });
            }
            None => return Err(Error::UnknownJobState { state: None }),
        };

        Ok(Self {
            state,
            data: payload,
        })
    }

    /// Build the wire payload for this status
    pub fn to_payload(&self) -> Payload {
        let mut payload = self.data.clone();
        payload.insert(fields::STATE.into(), Value::String(self.state.name().into()));
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_job_id_from_payload() {
        assert_eq!(JobId::from_payload(&payload(json!({"job_id": 12}))).unwrap(), JobId(12));
        assert!(JobId::from_payload(&payload(json!({}))).is_err());
        assert!(JobId::from_payload(&payload(json!({"job_id": "12"}))).is_err());
    }

    #[test]
    fn test_job_id_to_payload() {
        assert_eq!(JobId(3).to_payload(), payload(json!({"job_id": 3})));
    }

    #[test]
    fn test_state_parse() {
        assert_eq!(JobState::parse("pending").unwrap(), JobState::Pending);
        assert_eq!(JobState::parse("succeeded").unwrap(), JobState::Succeeded);
        assert_eq!(JobState::parse("failed").unwrap(), JobState::Failed);
    }

    #[test]
    fn test_state_parse_unknown() {
        for raw in ["Pending", "running", ""] {
            assert!(matches!(
                JobState::parse(raw),
                Err(Error::UnknownJobState { state: Some(s) }) if s == raw
            ));
        }
    }

    #[test]
    fn test_state_terminal() {
        assert!(!JobState::Pending.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn test_status_strips_state() {
        let status = JobStatus::from_payload(payload(json!({"state": "succeeded", "x": 1}))).unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.data, payload(json!({"x": 1})));
        assert_eq!(status.to_payload(), payload(json!({"state": "succeeded", "x": 1})));
    }

    #[test]
    fn test_status_missing_state() {
        let result = JobStatus::from_payload(payload(json!({"x": 1})));
        assert!(matches!(result, Err(Error::UnknownJobState { state: None })));
    }

    #[test]
    fn test_status_non_string_state() {
        let result = JobStatus::from_payload(payload(json!({"state": 2})));
        assert!(matches!(result, Err(Error::UnknownJobState { state: Some(s) }) if s == "2"));
    }
}
