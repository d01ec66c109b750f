//! Waiting for device-side jobs
//!
//! Enrollment starts a job and returns its id immediately. The poller then
//! queries the job's status at a fixed interval until it reaches a terminal
//! state, the wait budget runs out, or the caller cancels.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bioterm_core::constants::{DEFAULT_JOB_TIMEOUT, DEFAULT_POLL_INTERVAL};
use bioterm_core::{JobId, JobState, JobStatus, Payload};

use crate::error::{Error, Result};

/// A job started on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,

    /// When the start command returned
    pub created_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            created_at: Utc::now(),
        }
    }
}

/// Job status poller
#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    poll_interval: Duration,
    timeout: Duration,
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_JOB_TIMEOUT)
    }
}

impl JobPoller {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll until the job reaches a terminal state
    ///
    /// `poll` performs one status query. The first query happens right away;
    /// later ones are spaced by the poll interval. After each `pending`
    /// answer the elapsed time is compared to the wait budget.
    ///
    /// On success returns the completion data (the status payload without
    /// its `state` field).
    ///
    /// # Errors
    ///
    /// - [`Error::JobFailed`]: the device reported the job as failed
    /// - [`Error::JobTimeout`]: still pending when the budget ran out; the
    ///   job may keep running on the device
    /// - [`Error::Cancelled`]: `cancel` fired before a terminal state
    /// - any error returned by `poll`, unchanged
    pub async fn wait<F, Fut>(&self, job_id: JobId, cancel: &CancellationToken, mut poll: F) -> Result<Payload>
    where
        F: FnMut(JobId) -> Fut,
        Fut: Future<Output = Result<JobStatus>>,
    {
        let started = Instant::now();
        let mut polls = 0u32;

        debug!(%job_id, interval = ?self.poll_interval, timeout = ?self.timeout, "Waiting for job");

        loop {
            if cancel.is_cancelled() {
                info!(%job_id, polls, "Job wait cancelled");
                return Err(Error::Cancelled);
            }

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(%job_id, polls, "Job wait cancelled");
                    return Err(Error::Cancelled);
                }
                status = poll(job_id) => status?,
            };
            polls += 1;

            match status.state {
                JobState::Succeeded => {
                    info!(%job_id, polls, elapsed = ?started.elapsed(), "Job succeeded");
                    return Ok(status.data);
                }
                JobState::Failed => {
                    warn!(%job_id, polls, "Job failed");
                    return Err(Error::JobFailed {
                        job_id,
                        details: status.data,
                    });
                }
                JobState::Pending => {
                    let elapsed = started.elapsed();
                    if elapsed >= self.timeout {
                        warn!(%job_id, polls, ?elapsed, "Job still pending, giving up");
                        return Err(Error::JobTimeout { job_id, elapsed });
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            info!(%job_id, polls, "Job wait cancelled");
                            return Err(Error::Cancelled);
                        }
                        _ = sleep(self.poll_interval) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn status(state: JobState, data: Value) -> JobStatus {
        JobStatus {
            state,
            data: data.as_object().cloned().unwrap(),
        }
    }

    fn pending() -> JobStatus {
        status(JobState::Pending, json!({}))
    }

    /// Poll function answering from a script, counting calls
    fn scripted(
        script: Vec<JobStatus>,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut(JobId) -> std::future::Ready<Result<JobStatus>> {
        let mut script = VecDeque::from(script);
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            let next = script.pop_front().unwrap_or_else(pending);
            std::future::ready(Ok(next))
        }
    }

    fn poller() -> JobPoller {
        JobPoller::new(Duration::from_secs(1), Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_pending() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = scripted(
            vec![pending(), pending(), status(JobState::Succeeded, json!({"x": 1}))],
            calls.clone(),
        );

        let started = Instant::now();
        let data = poller()
            .wait(JobId(7), &CancellationToken::new(), poll)
            .await
            .unwrap();

        assert_eq!(Value::Object(data), json!({"x": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = scripted(vec![status(JobState::Succeeded, json!({}))], calls.clone());

        let started = Instant::now();
        let data = poller().wait(JobId(1), &CancellationToken::new(), poll).await.unwrap();

        assert!(data.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_job_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = scripted(vec![], calls.clone());

        let result = poller().wait(JobId(9), &CancellationToken::new(), poll).await;

        match result {
            Err(Error::JobTimeout { job_id, elapsed }) => {
                assert_eq!(job_id, JobId(9));
                assert_eq!(elapsed, Duration::from_secs(5));
            }
            other => panic!("expected JobTimeout, got {other:?}"),
        }

        // Polls at 0..=5 s, then no more
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_returns_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poll = scripted(
            vec![status(JobState::Failed, json!({"reason": "no finger"}))],
            calls.clone(),
        );

        let result = poller().wait(JobId(2), &CancellationToken::new(), poll).await;

        match result {
            Err(Error::JobFailed { job_id, details }) => {
                assert_eq!(job_id, JobId(2));
                assert_eq!(details.get("reason"), Some(&json!("no finger")));
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_propagates() {
        let result = poller()
            .wait(JobId(3), &CancellationToken::new(), |job_id| async move {
                Err::<JobStatus, _>(Error::UnknownJobState {
                    job_id,
                    state: "running".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(Error::UnknownJobState { state, .. }) if state == "running"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poller().wait(JobId(4), &cancel, scripted(vec![], calls.clone())).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_sleep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result = poller().wait(JobId(5), &cancel, scripted(vec![], calls.clone())).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_poll() {
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(300)).await;
            canceller.cancel();
        });

        let result = poller()
            .wait(JobId(6), &cancel, |_| std::future::pending::<Result<JobStatus>>())
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_job_handle() {
        let handle = JobHandle::new(JobId(11));
        assert_eq!(handle.job_id, JobId(11));
        assert!(handle.created_at <= Utc::now());
    }
}
