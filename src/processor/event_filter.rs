use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

use crate::error::FilterError;
use crate::models::message::{is_truthy, FrigateMessage, RawDetectionRecord};
use crate::models::skip_rule::SkipRules;

const REQUIRED_FIELDS: [&str; 6] = [
    "false_positive",
    "camera",
    "label",
    "current_zones",
    "entered_zones",
    "frame_time",
];

#[derive(Debug, Clone, PartialEq)]
pub enum SuppressReason {
    Unparseable(String),
    EndOfTrack,
    MissingAfter,
    MissingField(&'static str),
    FalsePositive,
    EmptyField(&'static str),
    InvalidField(&'static str),
    Stationary,
    SameZone,
    SkipRule(String),
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressReason::Unparseable(e) => write!(f, "Can't parse Frigate event message: {}", e),
            SuppressReason::EndOfTrack => {
                write!(f, "Frigate event skipped, ignoring Message type 'end'")
            }
            SuppressReason::MissingAfter => {
                write!(f, "Frigate event skipped, 'after' missing from payload")
            }
            SuppressReason::MissingField(field) => {
                write!(f, "Frigate event skipped, missing field: {}", field)
            }
            SuppressReason::FalsePositive => {
                write!(f, "Frigate event skipped, it is a false positive")
            }
            SuppressReason::EmptyField(field) => {
                write!(f, "Frigate event skipped, field is empty: {}", field)
            }
            SuppressReason::InvalidField(field) => {
                write!(f, "Frigate event skipped, field has wrong type: {}", field)
            }
            SuppressReason::Stationary => write!(f, "Frigate event skipped, object is stationary"),
            SuppressReason::SameZone => {
                write!(f, "Frigate event skipped, object stayed within same zone")
            }
            SuppressReason::SkipRule(rule) => {
                write!(f, "Frigate event skipped, matched skip rule '{}'", rule)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Forward,
    Suppress(SuppressReason),
}

impl Decision {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Decision::Suppress(_))
    }
}

/// `true` drops the event. A skip rule naming an absent field is an error, not a suppression.
pub fn should_suppress(payload: &[u8], rules: &SkipRules) -> Result<bool, FilterError> {
    let decision = evaluate(payload, rules)?;
    if let Decision::Suppress(reason) = &decision {
        warn!("{}", reason);
    }
    Ok(decision.is_suppressed())
}

pub fn evaluate(payload: &[u8], rules: &SkipRules) -> Result<Decision, FilterError> {
    match FrigateMessage::from_slice(payload) {
        Ok(message) => evaluate_message(&message, rules),
        Err(e) => Ok(Decision::Suppress(SuppressReason::Unparseable(e.to_string()))),
    }
}

pub fn evaluate_message(message: &FrigateMessage, rules: &SkipRules) -> Result<Decision, FilterError> {
    if message.is_type("end") {
        return Ok(Decision::Suppress(SuppressReason::EndOfTrack));
    }

    let Some(after) = &message.after else {
        return Ok(Decision::Suppress(SuppressReason::MissingAfter));
    };

    if let Some(reason) = check_required_fields(after) {
        return Ok(Decision::Suppress(reason));
    }

    if message.is_type("update") {
        if let Some(before) = &message.before {
            if let Some(reason) = check_unchanged(before, after) {
                return Ok(Decision::Suppress(reason));
            }
        }
    }

    if let Some(rule) = rules.first_match(after)? {
        return Ok(Decision::Suppress(SuppressReason::SkipRule(rule.to_string())));
    }

    Ok(Decision::Forward)
}

fn check_required_fields(after: &RawDetectionRecord) -> Option<SuppressReason> {
    for field in REQUIRED_FIELDS {
        let Some(value) = after.field(field) else {
            return Some(SuppressReason::MissingField(field));
        };

        match field {
            "false_positive" => {
                if value == &Value::Bool(true) {
                    return Some(SuppressReason::FalsePositive);
                }
                continue;
            }
            // An object outside every zone is still worth reporting.
            "current_zones" => {}
            _ => {
                if !is_truthy(value) {
                    return Some(SuppressReason::EmptyField(field));
                }
            }
        }

        if !has_expected_type(field, value) {
            return Some(SuppressReason::InvalidField(field));
        }
    }
    None
}

fn has_expected_type(field: &str, value: &Value) -> bool {
    match field {
        "camera" | "label" => value.is_string(),
        "current_zones" | "entered_zones" => value
            .as_array()
            .is_some_and(|zones| zones.iter().all(Value::is_string)),
        "frame_time" => value.is_number(),
        _ => true,
    }
}

fn check_unchanged(before: &RawDetectionRecord, after: &RawDetectionRecord) -> Option<SuppressReason> {
    if before.bool_field("stationary") == Some(true) && after.bool_field("stationary") == Some(true) {
        return Some(SuppressReason::Stationary);
    }

    let zones_settled = same_zones(after.field("current_zones"), after.field("entered_zones"));
    let zones_unchanged = same_zones(before.field("current_zones"), after.field("current_zones"))
        && same_zones(before.field("entered_zones"), after.field("entered_zones"));

    if zones_settled || zones_unchanged {
        return Some(SuppressReason::SameZone);
    }
    None
}

// Order-insensitive. Non-list values compare as-is.
fn same_zones(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::Array(a)), Some(Value::Array(b))) => zone_set(a) == zone_set(b),
        (a, b) => a == b,
    }
}

fn zone_set(zones: &[Value]) -> BTreeSet<String> {
    zones
        .iter()
        .map(|zone| match zone {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_after() -> Value {
        json!({
            "false_positive": false,
            "camera": "driveway",
            "label": "person",
            "sub_label": null,
            "current_zones": [],
            "entered_zones": ["front_yard"],
            "frame_time": 1700000000
        })
    }

    fn decide(message: Value) -> Decision {
        decide_with(message, &SkipRules::default())
    }

    fn decide_with(message: Value, rules: &SkipRules) -> Decision {
        let payload = serde_json::to_vec(&message).unwrap();
        evaluate(&payload, rules).unwrap()
    }

    #[test]
    fn test_forwards_new_event() {
        let message = json!({"type": "new", "after": valid_after()});
        assert_eq!(decide(message), Decision::Forward);
    }

    #[test]
    fn test_unparseable_payload() {
        let decision = evaluate(b"{not json", &SkipRules::default()).unwrap();
        assert!(matches!(decision, Decision::Suppress(SuppressReason::Unparseable(_))));
        assert!(should_suppress(b"", &SkipRules::default()).unwrap());
    }

    #[test]
    fn test_end_events_are_suppressed() {
        let message = json!({"type": "end", "after": valid_after()});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::EndOfTrack));

        let message = json!({"type": "end"});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::EndOfTrack));
    }

    #[test]
    fn test_missing_after() {
        let message = json!({"type": "new", "before": valid_after()});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::MissingAfter));
    }

    #[test]
    fn test_missing_field_checked_in_order() {
        let mut after = valid_after();
        let fields = after.as_object_mut().unwrap();
        fields.remove("label");
        fields.remove("frame_time");

        let message = json!({"type": "new", "after": after});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::MissingField("label")));
    }

    #[test]
    fn test_false_positive() {
        let mut after = valid_after();
        after["false_positive"] = json!(true);
        let message = json!({"type": "new", "after": after});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::FalsePositive));
    }

    #[test]
    fn test_non_boolean_false_positive_is_accepted() {
        let mut after = valid_after();
        after["false_positive"] = json!(null);
        let message = json!({"type": "new", "after": after});
        assert_eq!(decide(message), Decision::Forward);
    }

    #[test]
    fn test_empty_required_fields() {
        for (field, empty) in [
            ("camera", json!("")),
            ("label", json!(null)),
            ("entered_zones", json!([])),
            ("frame_time", json!(0)),
        ] {
            let mut after = valid_after();
            after[field] = empty;
            let message = json!({"type": "new", "after": after});
            assert_eq!(
                decide(message),
                Decision::Suppress(SuppressReason::EmptyField(field)),
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_wrong_typed_required_fields() {
        for (field, wrong) in [
            ("camera", json!(42)),
            ("label", json!({"x": 1})),
            ("current_zones", json!("front_yard")),
            ("entered_zones", json!("front_yard")),
            ("entered_zones", json!([3])),
            ("frame_time", json!("1700000000")),
        ] {
            let mut after = valid_after();
            after[field] = wrong;
            let message = json!({"type": "new", "after": after});
            assert_eq!(
                decide(message),
                Decision::Suppress(SuppressReason::InvalidField(field)),
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_stationary_update() {
        let mut before = valid_after();
        before["stationary"] = json!(true);
        before["current_zones"] = json!(["porch"]);
        let mut after = valid_after();
        after["stationary"] = json!(true);

        let message = json!({"type": "update", "before": before, "after": after});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::Stationary));
    }

    #[test]
    fn test_settled_zones_suppress_update_regardless_of_stationary() {
        let before = valid_after();
        let mut after = valid_after();
        after["stationary"] = json!(false);
        after["current_zones"] = json!(["porch", "front_yard"]);
        after["entered_zones"] = json!(["front_yard", "porch"]);

        let message = json!({"type": "update", "before": before, "after": after});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::SameZone));
    }

    #[test]
    fn test_unchanged_zones_suppress_update() {
        let mut before = valid_after();
        before["current_zones"] = json!(["porch"]);
        before["entered_zones"] = json!(["front_yard", "porch"]);
        let mut after = valid_after();
        after["current_zones"] = json!(["porch"]);
        after["entered_zones"] = json!(["porch", "front_yard"]);

        let message = json!({"type": "update", "before": before, "after": after});
        assert_eq!(decide(message), Decision::Suppress(SuppressReason::SameZone));
    }

    #[test]
    fn test_update_entering_new_zone_is_forwarded() {
        let before = valid_after();
        let mut after = valid_after();
        after["current_zones"] = json!(["porch"]);
        after["entered_zones"] = json!(["front_yard", "porch"]);

        let message = json!({"type": "update", "before": before, "after": after});
        assert_eq!(decide(message), Decision::Forward);
    }

    #[test]
    fn test_zone_checks_only_apply_to_updates() {
        let message = json!({"type": "new", "before": valid_after(), "after": valid_after()});
        assert_eq!(decide(message), Decision::Forward);

        let message = json!({"type": "update", "after": valid_after()});
        assert_eq!(decide(message), Decision::Forward);
    }

    #[test]
    fn test_skip_rules() {
        let rules = SkipRules::from_json(r#"{"pets": {"label": ["cat", "dog"]}}"#).unwrap();

        let mut after = valid_after();
        after["label"] = json!("cat");
        let message = json!({"type": "new", "after": after});
        assert_eq!(
            decide_with(message, &rules),
            Decision::Suppress(SuppressReason::SkipRule("pets".to_string()))
        );

        let message = json!({"type": "new", "after": valid_after()});
        assert_eq!(decide_with(message, &rules), Decision::Forward);
    }

    #[test]
    fn test_misconfigured_skip_rule_fails_loudly() {
        let rules = SkipRules::from_json(r#"{"typo": {"zones": ["street"]}}"#).unwrap();
        let payload = serde_json::to_vec(&json!({"type": "new", "after": valid_after()})).unwrap();

        assert!(matches!(
            should_suppress(&payload, &rules),
            Err(FilterError::UnknownRuleField { .. })
        ));
    }

    #[test]
    fn test_suppression_reason_log_lines() {
        assert_eq!(
            SuppressReason::MissingField("camera").to_string(),
            "Frigate event skipped, missing field: camera"
        );
        assert_eq!(
            SuppressReason::InvalidField("frame_time").to_string(),
            "Frigate event skipped, field has wrong type: frame_time"
        );
        assert_eq!(
            SuppressReason::SameZone.to_string(),
            "Frigate event skipped, object stayed within same zone"
        );
    }
}
