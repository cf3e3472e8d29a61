use crate::date_key::DateLabel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// News snapshot stored for one day under `days/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub link: String,
    pub img_source: String,
    pub text_content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewCounter {
    #[serde(default)]
    pub count: u64,
}

/// Everything the JSON store holds, keyed by full document path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub documents: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: String,
    pub key: String,
    pub label: DateLabel,
    pub event: Option<EventRecord>,
}
