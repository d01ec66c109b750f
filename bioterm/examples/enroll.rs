//! Enrollment example
//!
//! Starts a fingerprint enrollment and waits for it. Press Ctrl-C to stop
//! waiting; the job is then cancelled on the device.

use std::time::Duration;

use bioterm::{Device, EnrollKind, Error};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var("DEVICE_HOST").unwrap_or_else(|_| "192.168.1.201".to_string());

    let mut device = Device::new(host)
        .with_poll_interval(Duration::from_millis(500))
        .with_job_timeout(Duration::from_secs(90));
    if let Ok(key) = std::env::var("DEVICE_API_KEY") {
        device = device.with_api_key(key);
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    println!("Place a finger on the sensor...");

    match device.enroll(EnrollKind::Fingerprint, &cancel).await {
        Ok(data) => println!("Enrolled: {}", serde_json::Value::Object(data)),
        Err(Error::Cancelled) => println!("Cancelled"),
        Err(Error::JobTimeout { elapsed, .. }) => println!("Gave up after {elapsed:?}"),
        Err(Error::JobFailed { details, .. }) => println!("Enrollment failed: {details:?}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
