use crate::config::AppConfig;
use crate::processor::message_processor::{self, ProcessorContext};
use crate::processor::topic_decoder::TopicDecoder;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Subscribes to Frigate events and snapshots, with a circuit breaker on repeated connection failures.
pub async fn start_mqtt_client(config: &AppConfig) -> anyhow::Result<()> {
    let mut mqttoptions = MqttOptions::new(
        config.mqtt_client_id.as_str(),
        config.mqtt_broker.as_str(),
        config.mqtt_port,
    );
    mqttoptions.set_keep_alive(Duration::from_secs(5));
    if !config.mqtt_username.is_empty() {
        mqttoptions.set_credentials(config.mqtt_username.as_str(), config.mqtt_password.as_str());
    }

    let (client, mut eventloop) = AsyncClient::new(mqttoptions, 100);

    let events_topic = format!("{}/events", config.topic_prefix);
    let snapshot_topic = format!("{}/+/+/snapshot", config.topic_prefix);

    let ctx = Arc::new(ProcessorContext {
        events_topic: events_topic.clone(),
        notify_topic: config.notify_topic.clone(),
        skip_rules: config.skip_rules.clone(),
        composer: config.composer.clone(),
        decoder: TopicDecoder::new(&config.topic_prefix)?,
    });
    if ctx.skip_rules.is_empty() {
        info!("No skip rules configured");
    } else {
        info!("Loaded {} skip rule(s)", ctx.skip_rules.len());
    }
    info!("Notifications go to {}", ctx.notify_topic);

    let mut consecutive_failures = 0;
    let max_retries = config.mqtt_max_retries;
    let cooldown_duration = Duration::from_secs(config.mqtt_circuit_breaker_cooldown);

    loop {
        if consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.mqtt_circuit_breaker_cooldown
            );
            tokio::time::sleep(cooldown_duration).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming polling.");
        }

        match eventloop.poll().await {
            Ok(notification) => {
                consecutive_failures = 0;

                match notification {
                    Event::Incoming(Packet::Publish(publish)) => {
                        let ctx = ctx.clone();
                        let client = client.clone();
                        tokio::spawn(async move {
                            let topic: &[u8] = AsRef::<[u8]>::as_ref(&publish.topic);
                            if let Err(e) = message_processor::process_message(
                                &ctx,
                                &client,
                                topic,
                                &publish.payload,
                            )
                            .await
                            {
                                error!(
                                    "Error processing message on {}: {:#}",
                                    String::from_utf8_lossy(topic),
                                    e
                                );
                            }
                        });
                    }
                    Event::Incoming(Packet::ConnAck(_)) => {
                        info!("MQTT Connected!");
                        // Subscriptions do not survive a clean-session reconnect.
                        for (topic, qos) in [
                            (&events_topic, QoS::AtLeastOnce),
                            (&snapshot_topic, QoS::AtMostOnce),
                        ] {
                            match client.try_subscribe(topic.as_str(), qos) {
                                Ok(()) => info!("Subscribed to {}", topic),
                                Err(e) => error!("Failed to subscribe to {}: {}", topic, e),
                            }
                        }
                    }
                    Event::Incoming(Packet::SubAck(_)) => {
                        info!("Subscription confirmed!");
                    }
                    _ => {}
                }
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "MQTT Connection error: {}. Failure count ({} / {})",
                    e, consecutive_failures, max_retries
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
