use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

// Published on <prefix>/events.
#[derive(Debug, Deserialize)]
pub struct FrigateMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "parse_record_option")]
    pub before: Option<RawDetectionRecord>,
    #[serde(default, deserialize_with = "parse_record_option")]
    pub after: Option<RawDetectionRecord>,
}

impl FrigateMessage {
    // Anything other than a JSON object is rejected.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_slice(payload)?;
        serde_json::from_value(Value::Object(map))
    }

    pub fn is_type(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

// A field of the wrong type reads as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetectionRecord(Map<String, Value>);

impl RawDetectionRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }

    pub fn zones(&self, name: &str) -> Vec<String> {
        match self.field(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn frame_time(&self) -> Option<f64> {
        self.field("frame_time").and_then(Value::as_f64)
    }

    // A non-empty sub_label wins.
    pub fn label(&self) -> Option<&str> {
        self.str_field("sub_label")
            .filter(|s| !s.is_empty())
            .or_else(|| self.str_field("label"))
    }
}

// null, false, zero and empty strings, arrays and objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn parse_record_option<'de, D>(deserializer: D) -> Result<Option<RawDetectionRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<Value> = Option::deserialize(deserializer)?;
    match v {
        Some(Value::Object(map)) => Ok(Some(RawDetectionRecord::new(map))),
        _ => Ok(None),
    }
}
