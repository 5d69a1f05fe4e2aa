use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::fs;
use uuid::Uuid;

use crate::error::ConfigError;
use crate::models::skip_rule::SkipRules;
use crate::processor::notification_composer::{ComposerSettings, DEFAULT_EVENTS_URL};
use crate::processor::topic_decoder::DEFAULT_TOPIC_PREFIX;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    pub mqtt_username: String,
    pub mqtt_password: String,
    pub mqtt_client_id: String,
    pub mqtt_max_retries: u32,
    pub mqtt_circuit_breaker_cooldown: u64,
    pub topic_prefix: String,
    pub notify_topic: String,
    pub skip_rules: SkipRules,
    pub composer: ComposerSettings,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mqtt_broker = env::var("MQTT_BROKER").unwrap_or_else(|_| "localhost".to_string());
        let mqtt_port = env::var("MQTT_PORT")
            .unwrap_or_else(|_| "1883".to_string())
            .parse()
            .unwrap_or(1883);
        let mqtt_username = env::var("MQTT_USERNAME").unwrap_or_default();
        let mqtt_password = env::var("MQTT_PASSWORD").unwrap_or_default();
        let mqtt_client_id = env::var("MQTT_CLIENT_ID")
            .unwrap_or_else(|_| format!("frigate-notify-{}", Uuid::new_v4()));
        let mqtt_max_retries = env::var("MQTT_MAX_RETRIES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let mqtt_circuit_breaker_cooldown = env::var("MQTT_CIRCUIT_BREAKER_COOLDOWN")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let topic_prefix =
            env::var("FRIGATE_TOPIC_PREFIX").unwrap_or_else(|_| DEFAULT_TOPIC_PREFIX.to_string());
        let notify_topic =
            env::var("NOTIFY_TOPIC").unwrap_or_else(|_| format!("{}/notifications", topic_prefix));

        let skip_rules = load_skip_rules(
            env::var("FRIGATE_SKIP_RULES").ok().as_deref(),
            env::var("FRIGATE_SKIP_RULES_FILE").ok().as_deref(),
        )?;

        let composer = ComposerSettings {
            filename_template: env::var("NTFY_FILENAME_TEMPLATE")
                .ok()
                .filter(|t| !t.is_empty()),
            attach_enabled: env::var("NTFY_ATTACH_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            events_url: env::var("FRIGATE_EVENTS_URL")
                .unwrap_or_else(|_| DEFAULT_EVENTS_URL.to_string()),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            mqtt_broker,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_client_id,
            mqtt_max_retries,
            mqtt_circuit_breaker_cooldown,
            topic_prefix,
            notify_topic,
            skip_rules,
            composer,
            log_level,
        })
    }
}

// The rules file wins over inline JSON.
fn load_skip_rules(inline: Option<&str>, file: Option<&str>) -> Result<SkipRules, ConfigError> {
    if let Some(path) = file.filter(|p| !p.is_empty()) {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::SkipRulesFile {
            path: path.to_string(),
            source,
        })?;
        return Ok(SkipRules::from_json(&raw)?);
    }
    match inline.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(SkipRules::from_json(raw)?),
        _ => Ok(SkipRules::default()),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
