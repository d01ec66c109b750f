//! Device information and settings example

use anyhow::Context;
use bioterm::Device;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = std::env::var("DEVICE_HOST").unwrap_or_else(|_| "192.168.1.201".to_string());

    let mut device = Device::new(host);
    if let Ok(key) = std::env::var("DEVICE_API_KEY") {
        device = device.with_api_key(key);
    }

    println!("Talking to {}", device.endpoint());

    let info = device.get_version_info().await.context("GetVersionInfo")?;
    println!("{}", info);
    println!("UID: {}", device.get_device_uid().await?);
    println!("Time: {}", device.get_device_time().await?);

    let limits = device.get_capacity_limit().await?;
    let usage = device.get_current_usage().await?;
    for (kind, limit) in &limits {
        let used = usage.get(kind).copied().unwrap_or(0);
        println!("  {kind:<12} {used:>6} / {limit}");
    }

    let capabilities = device.get_device_capabilities().await?;
    println!("Capabilities: {}", capabilities.enabled().collect::<Vec<_>>().join(", "));

    println!("Device id:    {}", device.get_device_id().await?);
    println!("Sound volume: {}", device.get_sound_volume().await?);
    println!("Verify mode:  {}", device.get_verify_mode().await?);

    // Sync clock with this machine
    device.set_device_time(None).await?;
    println!("Clock set to {}", device.get_device_time().await?);

    Ok(())
}
