mod config;
mod error;
mod models;
mod mqtt;
mod processor;

use config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Frigate Notify Service...");
    info!(
        "Connecting to MQTT broker {}:{} (topic prefix '{}')",
        config.mqtt_broker, config.mqtt_port, config.topic_prefix
    );

    mqtt::start_mqtt_client(&config).await?;

    Ok(())
}
