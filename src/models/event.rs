use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::error::TemplateError;
use crate::models::message::RawDetectionRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    pub time: DateTime<Utc>,
    pub camera: String,
    pub label: String,
    pub current_zones: Vec<String>,
    pub entered_zones: Vec<String>,
}

impl DetectionEvent {
    // Input has already passed the event filter.
    pub fn from_record(record: &RawDetectionRecord) -> Self {
        Self {
            time: epoch_to_utc(record.frame_time().unwrap_or_default()),
            camera: record.str_field("camera").unwrap_or_default().to_string(),
            label: record.label().unwrap_or_default().to_string(),
            current_zones: record.zones("current_zones"),
            entered_zones: record.zones("entered_zones"),
        }
    }

    pub fn current_zones_str(&self) -> String {
        display_zones(&self.current_zones)
    }

    pub fn entered_zones_str(&self) -> String {
        display_zones(&self.entered_zones)
    }

    pub fn time_str(&self) -> String {
        format_time(&self.time)
    }

    pub fn template_field(&self, name: &str, spec: Option<&str>) -> Result<String, TemplateError> {
        let spec = spec.filter(|s| !s.is_empty());
        let value = match name {
            "time" => {
                return match spec {
                    Some(spec) => format_time_with(&self.time, spec),
                    None => Ok(self.time_str()),
                }
            }
            "camera" => self.camera.clone(),
            "label" => self.label.clone(),
            "current_zones" => self.current_zones.join(","),
            "entered_zones" => self.entered_zones.join(","),
            other => return Err(TemplateError::UnknownField(other.to_string())),
        };
        match spec {
            Some(_) => Err(TemplateError::UnsupportedFormatSpec(name.to_string())),
            None => Ok(value),
        }
    }
}

pub fn display_zones(zones: &[String]) -> String {
    zones
        .iter()
        .map(|zone| zone.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

// Rounded to the microsecond. Out of range input maps to the epoch.
pub fn epoch_to_utc(seconds: f64) -> DateTime<Utc> {
    if !seconds.is_finite() {
        return DateTime::<Utc>::default();
    }
    let whole = seconds.floor();
    let fraction = ((seconds - whole) * 1_000_000.0).round() as i64;
    (whole as i64)
        .checked_mul(1_000_000)
        .and_then(|micros| micros.checked_add(fraction))
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .unwrap_or_default()
}

// YYYY-MM-DD HH:MM:SS[.ffffff]+00:00
pub fn format_time(time: &DateTime<Utc>) -> String {
    if time.timestamp_subsec_micros() == 0 {
        time.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

fn format_time_with(time: &DateTime<Utc>, spec: &str) -> Result<String, TemplateError> {
    if StrftimeItems::new(spec).any(|item| matches!(item, Item::Error)) {
        return Err(TemplateError::InvalidTimeFormat(spec.to_string()));
    }
    Ok(time.format(spec).to_string())
}
