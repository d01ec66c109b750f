//! Protocol constants

use std::time::Duration;

/// Control endpoint path on the device
pub const CONTROL_PATH: &str = "/control";

/// Query parameter carrying the API key
pub const API_KEY_PARAM: &str = "api_key";

/// Per-transaction timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between two job status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wall-clock budget for waiting on an enrollment job
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on pages fetched by one accumulation
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Length of a correlation id in characters
pub const MESSAGE_ID_LEN: usize = 8;

/// Error code used when the device omits one
pub const UNKNOWN_ERROR_CODE: &str = "unknown_error";

/// Envelope field names
pub mod fields {
    /// Correlation id
    pub const MID: &str = "mid";

    /// Command name (requests only)
    pub const CMD: &str = "cmd";

    /// Outcome marker (responses only)
    pub const RESULT: &str = "result";

    /// Command-specific body
    pub const PAYLOAD: &str = "payload";

    /// Device error code
    pub const CODE: &str = "code";

    /// Device error arguments
    pub const ARGUMENTS: &str = "arguments";

    /// Job identifier
    pub const JOB_ID: &str = "job_id";

    /// Job state
    pub const STATE: &str = "state";

    /// Pagination start position (requests)
    pub const START_POS: &str = "start_pos";
}

/// Job state strings reported by `QueryJobStatus`
pub mod job_states {
    pub const PENDING: &str = "pending";
    pub const SUCCEEDED: &str = "succeeded";
    pub const FAILED: &str = "failed";
}
