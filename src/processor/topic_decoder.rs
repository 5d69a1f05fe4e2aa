use regex::Regex;

use crate::models::topic::{SnapshotAddress, TopicMatch};

pub const DEFAULT_TOPIC_PREFIX: &str = "frigate";

#[derive(Debug, Clone)]
pub struct TopicDecoder {
    pattern: Regex,
}

impl TopicDecoder {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^{}/(?P<camera_name>.+?)/(?P<object_name>.+?)/snapshot$",
            regex::escape(prefix)
        ))?;
        Ok(Self { pattern })
    }

    // None when the topic is not valid UTF-8.
    pub fn decode(&self, topic: &[u8]) -> Option<TopicMatch> {
        let topic = std::str::from_utf8(topic).ok()?;
        Some(self.decode_str(topic))
    }

    pub fn decode_str(&self, topic: &str) -> TopicMatch {
        match self.pattern.captures(topic) {
            Some(caps) => TopicMatch::Snapshot(SnapshotAddress {
                camera_name: caps["camera_name"].to_string(),
                object_name: caps["object_name"].to_string(),
            }),
            None => TopicMatch::NoMatch,
        }
    }
}
