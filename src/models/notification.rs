use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationParameters {
    pub title: String,
    pub format: String,
    pub click: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<String>,
}

impl NotificationParameters {
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::from([
            ("title", self.title.clone()),
            ("format", self.format.clone()),
            ("click", self.click.clone()),
        ]);
        if let Some(attach) = &self.attach {
            map.insert("attach", attach.clone());
        }
        map
    }
}
