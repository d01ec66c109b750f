//! User management example

use bioterm::{Device, Error, Privilege, UserInfo};
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

    // Page by page
    let mut pages = device.user_ids();
    while let Some(ids) = pages.next_page().await? {
        println!("Page {}: {:?}", pages.pages_fetched(), ids);
    }

    let user = UserInfo::new("999")
        .name("Test User")
        .department("Engineering")
        .privilege(Privilege::User);

    match device.set_user_info(&user).await {
        Ok(()) => println!("Created user 999"),
        Err(Error::Device(e)) if e.code == "dup_id" => println!("User 999 already exists"),
        Err(e) => return Err(e.into()),
    }

    let stored = device.get_user_info("999").await?;
    println!("Stored: {:?}", stored);

    device.delete_user_info("999").await?;
    println!("Deleted user 999");

    let total = device.get_all_user_ids().await?.len();
    println!("{total} users on device");

    Ok(())
}
