use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::FilterError;
use crate::models::message::RawDetectionRecord;

// Field name -> values that trigger a skip. Every field must match; a list
// field matches when all of its elements are listed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SkipRule {
    #[serde(deserialize_with = "parse_field_values")]
    pub fields: BTreeMap<String, Vec<Value>>,
}

impl SkipRule {
    pub fn matches(&self, name: &str, record: &RawDetectionRecord) -> Result<bool, FilterError> {
        let mut do_skip = true;
        for (field, skip_values) in &self.fields {
            let actual = record.field(field).ok_or_else(|| FilterError::UnknownRuleField {
                rule: name.to_string(),
                field: field.clone(),
            })?;
            do_skip = do_skip && value_matches(actual, skip_values);
        }
        Ok(do_skip)
    }
}

pub fn value_matches(actual: &Value, skip_values: &[Value]) -> bool {
    match actual {
        Value::Array(items) => items.iter().all(|item| is_listed(item, skip_values)),
        other => is_listed(other, skip_values),
    }
}

// Numbers compare by value, so `1` and `1.0` are the same.
fn is_listed(value: &Value, skip_values: &[Value]) -> bool {
    skip_values.iter().any(|skip| match (value, skip) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SkipRules(BTreeMap<String, SkipRule>);

impl SkipRules {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first_match(&self, record: &RawDetectionRecord) -> Result<Option<&str>, FilterError> {
        for (name, rule) in &self.0 {
            if rule.matches(name, record)? {
                return Ok(Some(name.as_str()));
            }
        }
        Ok(None)
    }
}

// Accepts "cat" as shorthand for ["cat"].
fn parse_field_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Value>),
        One(Value),
    }

    let raw: BTreeMap<String, OneOrMany> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(field, values)| match values {
            OneOrMany::Many(values) => (field, values),
            OneOrMany::One(value) => (field, vec![value]),
        })
        .collect())
}
