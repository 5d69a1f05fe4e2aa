use rumqttc::{AsyncClient, QoS};
use tracing::{debug, info, warn};

use crate::models::notification::NotificationParameters;
use crate::models::skip_rule::SkipRules;
use crate::models::topic::TopicMatch;
use crate::processor::event_filter;
use crate::processor::notification_composer::{self, ComposerSettings};
use crate::processor::topic_decoder::TopicDecoder;

#[derive(Debug, Clone)]
pub struct ProcessorContext {
    pub events_topic: String,
    pub notify_topic: String,
    pub skip_rules: SkipRules,
    pub composer: ComposerSettings,
    pub decoder: TopicDecoder,
}

pub async fn process_message(
    ctx: &ProcessorContext,
    client: &AsyncClient,
    topic: &[u8],
    payload: &[u8],
) -> anyhow::Result<()> {
    if topic == ctx.events_topic.as_bytes() {
        let Some(params) = prepare_notification(ctx, payload)? else {
            return Ok(());
        };

        info!("Notifying: {}", params.title);
        let body = serde_json::to_vec(&params.to_map())?;
        client
            .publish(&ctx.notify_topic, QoS::AtLeastOnce, false, body)
            .await?;
        return Ok(());
    }

    match ctx.decoder.decode(topic) {
        Some(TopicMatch::NoMatch) => {
            warn!("Ignoring message on unexpected topic {}", String::from_utf8_lossy(topic));
        }
        Some(address) => {
            debug!(address = ?address.to_map(), bytes = payload.len(), "Received snapshot");
        }
        None => warn!("Ignoring message with non UTF-8 topic"),
    }
    Ok(())
}

pub fn prepare_notification(
    ctx: &ProcessorContext,
    payload: &[u8],
) -> anyhow::Result<Option<NotificationParameters>> {
    if event_filter::should_suppress(payload, &ctx.skip_rules)? {
        return Ok(None);
    }
    let params = notification_composer::compose(payload, &ctx.composer)?;
    Ok(Some(params))
}
