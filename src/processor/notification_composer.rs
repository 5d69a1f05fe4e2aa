use url::Url;

use crate::error::ComposeError;
use crate::models::event::DetectionEvent;
use crate::models::message::FrigateMessage;
use crate::models::notification::NotificationParameters;
use crate::processor::filename_template;

pub const DEFAULT_EVENTS_URL: &str = "https://frigate/events";

#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub filename_template: Option<String>,
    // Rendered filename is only sent as `attach` when set.
    pub attach_enabled: bool,
    pub events_url: String,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            filename_template: None,
            attach_enabled: false,
            events_url: DEFAULT_EVENTS_URL.to_string(),
        }
    }
}

pub fn compose(payload: &[u8], settings: &ComposerSettings) -> Result<NotificationParameters, ComposeError> {
    let message = FrigateMessage::from_slice(payload)?;
    let after = message.after.ok_or(ComposeError::MissingAfter)?;
    let event = DetectionEvent::from_record(&after);
    compose_event(&event, settings)
}

pub fn compose_event(
    event: &DetectionEvent,
    settings: &ComposerSettings,
) -> Result<NotificationParameters, ComposeError> {
    let attach_filename = settings
        .filename_template
        .as_deref()
        .map(|template| filename_template::render(template, event))
        .transpose()?;

    let zone = event.entered_zones.first().ok_or(ComposeError::NoEnteredZone)?;
    let click = Url::parse_with_params(
        &settings.events_url,
        &[
            ("camera", event.camera.as_str()),
            ("label", event.label.as_str()),
            ("zone", zone.as_str()),
        ],
    )?;

    Ok(NotificationParameters {
        title: format!(
            "{} entered {} at {}",
            event.label,
            event.entered_zones_str(),
            event.time_str()
        ),
        format: format!("{} was in {}", event.label, event.current_zones_str()),
        click: click.into(),
        attach: attach_filename.filter(|_| settings.attach_enabled),
    })
}
