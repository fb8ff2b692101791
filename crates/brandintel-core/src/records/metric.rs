use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{non_negative, NewRecord, RecordKind};
use crate::{FieldErrors, ValidationError};

/// Engagement counters for one content item at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub content_id: String,
    pub likes: i64,
    pub comments: i64,
    pub views: Option<i64>,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMetric {
    /// Taken from the request path.
    #[serde(default, skip_deserializing)]
    pub content_id: String,
    pub likes: i64,
    pub comments: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
}

impl NewRecord for NewMetric {
    const KIND: RecordKind = RecordKind::Metric;
    const REQUIRED: &'static [&'static str] = &["likes", "comments"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        non_negative(&mut errors, "likes", Some(self.likes));
        non_negative(&mut errors, "comments", Some(self.comments));
        non_negative(&mut errors, "views", self.views);
        errors.finish()
    }
}
