use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotAddress {
    pub camera_name: String,
    pub object_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicMatch {
    Snapshot(SnapshotAddress),
    NoMatch,
}

impl TopicMatch {
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        match self {
            TopicMatch::Snapshot(address) => BTreeMap::from([
                ("camera_name", address.camera_name.clone()),
                ("object_name", address.object_name.clone()),
            ]),
            TopicMatch::NoMatch => BTreeMap::new(),
        }
    }
}
