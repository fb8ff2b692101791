use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{not_blank, valid_url, NewRecord, RecordKind};
use crate::{FieldErrors, ValidationError};

/// Creative identity of a brand's website captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteSnapshot {
    pub id: String,
    pub brand_id: String,
    pub page_url: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default = "empty_object")]
    pub visual_identity: Value,
    #[serde(default = "empty_object")]
    pub typography: Value,
    #[serde(default = "empty_object")]
    pub messaging: Value,
    #[serde(default = "empty_object")]
    pub navigation: Value,
    #[serde(default = "empty_object")]
    pub screenshots: Value,
    #[serde(default = "empty_object")]
    pub stats: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWebsiteSnapshot {
    pub brand_id: String,
    pub page_url: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub visual_identity: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub typography: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub messaging: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub navigation: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub screenshots: Value,
    #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
    pub stats: Value,
}

impl NewWebsiteSnapshot {
    fn sections(&self) -> [(&'static str, &Value); 6] {
        [
            ("visual_identity", &self.visual_identity),
            ("typography", &self.typography),
            ("messaging", &self.messaging),
            ("navigation", &self.navigation),
            ("screenshots", &self.screenshots),
            ("stats", &self.stats),
        ]
    }
}

impl NewRecord for NewWebsiteSnapshot {
    const KIND: RecordKind = RecordKind::WebsiteSnapshot;
    const REQUIRED: &'static [&'static str] = &["brand_id", "page_url", "captured_at"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        not_blank(&mut errors, "brand_id", &self.brand_id);
        valid_url(&mut errors, "page_url", &self.page_url);
        for (field, value) in self.sections() {
            errors.ensure(value.is_object(), field, "must be a JSON object");
        }
        errors.finish()
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Explicit `null` sections are stored as `{}`.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.unwrap_or_else(empty_object))
}
