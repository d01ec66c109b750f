//! High-level device interface

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bioterm_core::constants::{fields, DEFAULT_MAX_PAGES};
use bioterm_core::{Command, JobId, JobStatus, Payload};
use bioterm_transport::{HttpTransport, Transport};
use bioterm_types::serde_util::yes_no;
use bioterm_types::{
    AttendLogPage, AttendLogRecord, CapacityLimit, CurrentUsage, Cursor, DeviceCapabilities,
    DeviceControlAction, DeviceId, DeviceTime, EnrollKind, NetworkConfig, PhotoConversion,
    SecurityConfig, SoundVolume, UploadInterval, UploaderConfig, UploaderStatus, UserIdPage,
    UserInfo, VerifyMode, VersionInfo,
};

use crate::client::{from_payload, to_payload, Client};
use crate::error::{Error, Result};
use crate::pagination::{Page, PageFuture, Paginator};
use crate::poller::{JobHandle, JobPoller};

/// Biometric terminal
///
/// Typed interface to every command of the device's JSON control API.
/// Each method is one transaction (listings and job waits are several)
/// and nothing is retried.
///
/// # Examples
///
/// ```no_run
/// use bioterm::Device;
///
/// #[tokio::main]
/// async fn main() -> bioterm::Result<()> {
///     let device = Device::new("192.168.1.201").with_api_key("secret");
///
///     let info = device.get_version_info().await?;
///     println!("Device: {}", info);
///
///     for id in device.get_all_user_ids().await? {
///         println!("User {}", id);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Device {
    client: Client,
    poller: JobPoller,
    max_pages: usize,
}

impl Device {
    /// Create a device reached over plain HTTP
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_transport(HttpTransport::new(host))
    }

    /// Create a device reached over HTTPS
    ///
    /// Self-signed device certificates are accepted unless the transport
    /// is configured otherwise; see [`HttpTransport`].
    pub fn new_https(host: impl Into<String>) -> Self {
        Self::with_transport(HttpTransport::new(host).with_https(true))
    }

    /// Create a device over a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(Arc::new(transport))
    }

    /// Create a device over a transport shared with other handles
    pub fn with_shared_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            client: Client::from_shared(transport),
            poller: JobPoller::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set API key sent with every request
    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.client.session().set_api_key(Some(api_key.into()));
        self
    }

    /// Set per-transaction timeout (default: 30 s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Set delay between job status queries (default: 1 s)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = JobPoller::new(interval, self.poller.timeout());
        self
    }

    /// Set how long to wait for a job to finish (default: 60 s)
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.poller = JobPoller::new(self.poller.poll_interval(), timeout);
        self
    }

    /// Set page budget for full listings (default: 10 000)
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Get the protocol client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the endpoint requests are sent to
    pub fn endpoint(&self) -> String {
        self.client.endpoint()
    }

    /// Get the API key currently in use
    pub fn api_key(&self) -> Option<String> {
        self.client.session().api_key()
    }

    /// Send a raw command
    ///
    /// For commands without a typed method. The response payload is
    /// returned as-is.
    pub async fn transact(&self, command: impl AsRef<str>, payload: Payload) -> Result<Payload> {
        self.client.transact(command, payload).await
    }

    // Security

    /// Apply a security configuration
    ///
    /// When the configuration carries a new API key, later requests use it,
    /// but only once the device has accepted the change.
    pub async fn set_security_config(&self, config: &SecurityConfig) -> Result<()> {
        self.call_unit(Command::SetSecurityConfig, to_payload(config)?).await?;

        if let Some(api_key) = &config.api_key {
            self.client.session().set_api_key(Some(api_key.clone()));
            info!("API key updated");
        }
        info!(
            http = config.enable_http,
            https = config.tls_conf.enabled,
            "Security configuration applied"
        );
        Ok(())
    }

    // Users

    /// Get one page of user ids
    pub async fn get_user_id_list(&self, start_pos: Option<Cursor>) -> Result<UserIdPage> {
        let mut payload = Payload::new();
        if let Some(pos) = start_pos {
            payload.insert(fields::START_POS.into(), pos.into());
        }
        self.call(Command::GetUserIdList, payload).await
    }

    /// Page through user ids lazily
    pub fn user_ids<'a>(&'a self) -> Paginator<impl FnMut(Option<Cursor>) -> PageFuture<'a, String> + 'a> {
        Paginator::new(move |cursor| self.user_id_page(cursor)).with_max_pages(self.max_pages)
    }

    /// Get every user id on the device
    pub async fn get_all_user_ids(&self) -> Result<Vec<String>> {
        let ids = self.user_ids().collect_all().await?;
        debug!(count = ids.len(), "Listed user ids");
        Ok(ids)
    }

    /// Get one user record
    pub async fn get_user_info(&self, id: impl Into<String>) -> Result<UserInfo> {
        self.call(Command::GetUserInfo, id_payload(id)).await
    }

    /// Create or update a user
    ///
    /// Only the fields set on `user` are sent.
    pub async fn set_user_info(&self, user: &UserInfo) -> Result<()> {
        self.call_unit(Command::SetUserInfo, to_payload(user)?).await
    }

    /// Delete a user
    pub async fn delete_user_info(&self, id: impl Into<String>) -> Result<()> {
        self.call_unit(Command::DeleteUserInfo, id_payload(id)).await
    }

    // Device control

    /// Lock or unlock the device
    pub async fn lock_device(&self, locked: bool) -> Result<()> {
        let payload = single("is_locked", yes_no::as_str(locked));
        self.call_unit(Command::LockDevice, payload).await?;
        info!(locked, "Device lock changed");
        Ok(())
    }

    /// Run a bulk-clear action
    pub async fn device_control(&self, action: DeviceControlAction) -> Result<()> {
        warn!(%action, "Running device control action");
        self.call_unit(Command::DeviceControl, single("Action", action.name()))
            .await
    }

    // Enrollment

    /// Start an enrollment job
    pub async fn begin_enroll(&self, kind: EnrollKind) -> Result<JobHandle> {
        let command = match kind {
            EnrollKind::Face => Command::BeginEnrollFace,
            EnrollKind::Fingerprint => Command::BeginEnrollFp,
            EnrollKind::Card => Command::BeginEnrollCard,
            EnrollKind::Palm => Command::BeginEnrollPalm,
        };

        let payload = self.client.transact(command, Payload::new()).await?;
        let job_id = JobId::from_payload(&payload)?;

        info!(%kind, %job_id, "Enrollment started");
        Ok(JobHandle::new(job_id))
    }

    /// Query a job's current state
    pub async fn query_job_status(&self, job: &JobHandle) -> Result<JobStatus> {
        self.job_status(job.job_id).await
    }

    /// Cancel one job
    pub async fn cancel_job(&self, job: &JobHandle) -> Result<()> {
        self.call_unit(Command::CancelJob, job.job_id.to_payload()).await?;
        info!(job_id = %job.job_id, "Job cancelled");
        Ok(())
    }

    /// Cancel every running job
    pub async fn cancel_all_jobs(&self) -> Result<()> {
        self.call_unit(Command::CancelAllJobs, Payload::new()).await?;
        info!("All jobs cancelled");
        Ok(())
    }

    /// Wait for a job to finish and return its completion data
    ///
    /// Uses the configured poll interval and job timeout. A timeout or
    /// cancellation only stops waiting; the job itself is left alone.
    pub async fn wait_for_job(&self, job: &JobHandle, cancel: &CancellationToken) -> Result<Payload> {
        self.poller
            .wait(job.job_id, cancel, |job_id| self.job_status(job_id))
            .await
    }

    /// Enroll a credential: start the job and wait for it
    ///
    /// If `cancel` fires, the job is also cancelled on the device.
    pub async fn enroll(&self, kind: EnrollKind, cancel: &CancellationToken) -> Result<Payload> {
        let job = self.begin_enroll(kind).await?;

        match self.wait_for_job(&job, cancel).await {
            Err(Error::Cancelled) => {
                if let Err(e) = self.cancel_job(&job).await {
                    warn!(job_id = %job.job_id, error = %e, "Failed to cancel job on device");
                }
                Err(Error::Cancelled)
            }
            result => result,
        }
    }

    /// Convert a base64 photo into face template data
    pub async fn photo_to_face_data(&self, photo_base64: impl Into<String>) -> Result<PhotoConversion> {
        self.call(Command::PhotoToFacedata, single("photo", photo_base64.into()))
            .await
    }

    // Attendance

    /// Get one page of attendance records
    pub async fn get_attend_log(&self, start_pos: Option<Cursor>) -> Result<AttendLogPage> {
        let mut payload = Payload::new();
        if let Some(pos) = start_pos {
            payload.insert(fields::START_POS.into(), pos.into());
        }
        self.call(Command::GetAttendLog, payload).await
    }

    /// Page through attendance records lazily
    pub fn attend_logs<'a>(&'a self) -> Paginator<impl FnMut(Option<Cursor>) -> PageFuture<'a, AttendLogRecord> + 'a> {
        Paginator::new(move |cursor| self.attend_log_page(cursor)).with_max_pages(self.max_pages)
    }

    /// Get every attendance record on the device
    pub async fn get_all_attend_logs(&self) -> Result<Vec<AttendLogRecord>> {
        let logs = self.attend_logs().collect_all().await?;
        debug!(count = logs.len(), "Listed attendance records");
        Ok(logs)
    }

    /// Erase attendance records up to `end_pos`
    pub async fn erase_attend_log(&self, end_pos: i64) -> Result<()> {
        info!(%end_pos, "Erasing attendance records");
        self.call_unit(Command::EraseAttendLog, single("end_pos", end_pos))
            .await
    }

    /// Configure automatic upload of attendance records
    ///
    /// `interval` is in seconds and must be within 5..=3600.
    pub async fn config_attend_log_uploader(&self, target_uri: impl Into<String>, interval: u32) -> Result<()> {
        let config = UploaderConfig::new(target_uri, UploadInterval::new(interval)?);
        self.call_unit(Command::ConfigAttendLogUploader, to_payload(&config)?)
            .await?;
        info!(uri = %config.target_uri, interval, "Attendance uploader configured");
        Ok(())
    }

    /// Get attendance uploader status
    pub async fn get_attend_log_uploader_status(&self) -> Result<UploaderStatus> {
        self.call(Command::GetAttendLogUploaderStatus, Payload::new()).await
    }

    // Time

    /// Get the device clock as reported (ISO-8601)
    pub async fn get_device_time(&self) -> Result<String> {
        let time: DeviceTime = self.call(Command::GetDeviceTime, Payload::new()).await?;
        Ok(time.time)
    }

    /// Set the device clock; `None` means local time now
    pub async fn set_device_time(&self, time: Option<NaiveDateTime>) -> Result<()> {
        let time = DeviceTime::from_naive(time.unwrap_or_else(|| Local::now().naive_local()));
        debug!(%time, "Setting device time");
        self.call_unit(Command::SetDeviceTime, to_payload(&time)?).await
    }

    // Network

    pub async fn get_network_config(&self) -> Result<NetworkConfig> {
        self.call(Command::GetNetworkConfig, Payload::new()).await
    }

    /// Apply network settings; sections left as `None` are not touched
    pub async fn set_network_config(&self, config: &NetworkConfig) -> Result<()> {
        self.call_unit(Command::SetNetworkConfig, to_payload(config)?).await?;
        info!("Network configuration applied");
        Ok(())
    }

    // Information

    pub async fn get_version_info(&self) -> Result<VersionInfo> {
        self.call(Command::GetVersionInfo, Payload::new()).await
    }

    pub async fn get_capacity_limit(&self) -> Result<CapacityLimit> {
        self.call(Command::GetCapacityLimit, Payload::new()).await
    }

    pub async fn get_current_usage(&self) -> Result<CurrentUsage> {
        self.call(Command::GetCurrentUsage, Payload::new()).await
    }

    /// Get the device's unique id (hex string)
    pub async fn get_device_uid(&self) -> Result<String> {
        self.get_field(Command::GetDeviceUid, "device_uid").await
    }

    pub async fn get_device_capabilities(&self) -> Result<DeviceCapabilities> {
        self.call(Command::GetDeviceCapabilities, Payload::new()).await
    }

    // Settings

    pub async fn get_device_id(&self) -> Result<DeviceId> {
        self.get_field(Command::GetDeviceId, "device_id").await
    }

    /// Set the device number (1..=255)
    pub async fn set_device_id(&self, device_id: u16) -> Result<()> {
        let device_id = DeviceId::new(device_id)?;
        self.call_unit(Command::SetDeviceId, single("device_id", device_id.get()))
            .await
    }

    pub async fn get_sound_volume(&self) -> Result<SoundVolume> {
        self.get_field(Command::GetSoundVolume, "sound_volume").await
    }

    /// Set the speaker volume (1..=10)
    pub async fn set_sound_volume(&self, volume: u16) -> Result<()> {
        let volume = SoundVolume::new(volume)?;
        self.call_unit(Command::SetSoundVolume, single("sound_volume", volume.get()))
            .await
    }

    pub async fn get_verify_mode(&self) -> Result<VerifyMode> {
        self.get_field(Command::GetVerifyMode, "verify_mode").await
    }

    /// Set the verification mode (0..=15)
    pub async fn set_verify_mode(&self, mode: u16) -> Result<()> {
        let mode = VerifyMode::new(mode)?;
        self.call_unit(Command::SetVerifyMode, single("verify_mode", mode.get()))
            .await
    }

    // Helper methods

    async fn call<T: DeserializeOwned>(&self, command: Command, payload: Payload) -> Result<T> {
        let response = self.client.transact(command, payload).await?;
        from_payload(command.name(), response)
    }

    async fn call_unit(&self, command: Command, payload: Payload) -> Result<()> {
        self.client.transact(command, payload).await.map(drop)
    }

    async fn get_field<T: DeserializeOwned>(&self, command: Command, key: &str) -> Result<T> {
        let mut response = self.client.transact(command, Payload::new()).await?;
        let value = response.remove(key).ok_or_else(|| {
            bioterm_core::Error::MalformedResponse(format!("{command} response missing `{key}`"))
        })?;
        serde_json::from_value(value).map_err(|e| {
            bioterm_core::Error::MalformedResponse(format!("{command} `{key}`: {e}")).into()
        })
    }

    fn user_id_page(&self, cursor: Option<Cursor>) -> PageFuture<'_, String> {
        Box::pin(async move {
            let page = self.get_user_id_list(cursor).await?;
            Ok(Page::new(page.user_ids, page.next_page_pos))
        })
    }

    fn attend_log_page(&self, cursor: Option<Cursor>) -> PageFuture<'_, AttendLogRecord> {
        Box::pin(async move {
            let page = self.get_attend_log(cursor).await?;
            Ok(Page::new(page.logs, page.next_pos))
        })
    }

    async fn job_status(&self, job_id: JobId) -> Result<JobStatus> {
        let payload = self.client.transact(Command::QueryJobStatus, job_id.to_payload()).await?;

        JobStatus::from_payload(payload).map_err(|e| match e {
            bioterm_core::Error::UnknownJobState { state } => {
                warn!(%job_id, ?state, "Unknown job state");
                Error::UnknownJobState {
                    job_id,
                    state: state.unwrap_or_else(|| "<missing>".into()),
                }
            }
            other => Error::Protocol(other),
        })
    }
}

fn single(key: &str, value: impl Into<Value>) -> Payload {
    let mut payload = Payload::new();
    payload.insert(key.into(), value.into());
    payload
}

fn id_payload(id: impl Into<String>) -> Payload {
    single("id", id.into())
}
