use anyhow::{Context, Result};
use log::info;
use sqlkit::config::Config;
use sqlkit::{logger, Service};

/// Connectivity check: connect with the configured settings, ping, disconnect.
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from_file(&path)?,
        None => Config::load()?,
    };

    logger::init(&config.logging)?;

    let database = &config.database;
    let mut service = Service::new(database.clone(), Some(config.service_config()));

    if let Err(e) = service.init().await {
        eprintln!("❌ Error: could not connect to {} database '{}'", database.client, database.database);
        return Err(e).context("Connection check failed");
    }

    info!("Connected to {}://{}:{}", database.client, database.host, database.port);
    println!("✅ Connected to {} database '{}'", database.client, database.database);

    service.disconnect().await.context("Failed to disconnect")?;

    Ok(())
}
