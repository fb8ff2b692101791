use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{not_blank, not_blank_opt, NewRecord, RecordKind};
use crate::{FieldErrors, ValidationError};

/// An intelligence signal observed for a brand (launch, style shift, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub brand_id: String,
    pub signal_type: String,
    pub confidence: f64,
    pub reason: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSignal {
    pub brand_id: String,
    pub signal_type: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub detected_at: DateTime<Utc>,
    /// Content items this signal is about; stored as `signal_content` links.
    #[serde(default, skip_serializing)]
    pub content_ids: Vec<String>,
}

impl NewRecord for NewSignal {
    const KIND: RecordKind = RecordKind::Signal;
    const REQUIRED: &'static [&'static str] =
        &["brand_id", "signal_type", "confidence", "detected_at"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        not_blank(&mut errors, "brand_id", &self.brand_id);
        not_blank(&mut errors, "signal_type", &self.signal_type);
        errors.ensure(
            (0.0..=1.0).contains(&self.confidence),
            "confidence",
            "must be between 0 and 1",
        );
        not_blank_opt(&mut errors, "reason", self.reason.as_deref());
        errors.ensure(
            self.content_ids.iter().all(|id| !id.trim().is_empty()),
            "content_ids",
            "ids must not be blank",
        );
        errors.finish()
    }
}

/// Many-to-many link between a signal and the content it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalContent {
    pub signal_id: String,
    pub content_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignalContent {
    pub signal_id: String,
    pub content_id: String,
}

impl NewRecord for NewSignalContent {
    const KIND: RecordKind = RecordKind::SignalContent;
    const REQUIRED: &'static [&'static str] = &["signal_id", "content_id"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        not_blank(&mut errors, "signal_id", &self.signal_id);
        not_blank(&mut errors, "content_id", &self.content_id);
        errors.finish()
    }
}
