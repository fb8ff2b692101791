//! Record kinds stored in the hosted database, with their row and create shapes.
//!
//! Row types mirror what the database returns. `New*` types are the create
//! payloads: they parse from an arbitrary JSON body, reporting absent required
//! fields individually, and carry their own semantic validation.

mod brand;
mod content;
mod metric;
mod signal;
mod snapshot;

pub use brand::{Brand, NewBrand};
pub use content::{Content, ContentMedia, NewContent, NewContentMedia, Platform};
pub use metric::{Metric, NewMetric};
pub use signal::{NewSignal, NewSignalContent, Signal, SignalContent};
pub use snapshot::{NewWebsiteSnapshot, WebsiteSnapshot};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{FieldErrors, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Brand,
    Signal,
    SignalContent,
    Content,
    ContentMedia,
    Metric,
    WebsiteSnapshot,
}

impl RecordKind {
    /// Table name in the hosted database.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Brand => "brands",
            Self::Signal => "signals",
            Self::SignalContent => "signal_content",
            Self::Content => "content",
            Self::ContentMedia => "content_media",
            Self::Metric => "content_metrics",
            Self::WebsiteSnapshot => "website_snapshots",
        }
    }

    /// Human-readable singular name used in error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Signal => "signal",
            Self::SignalContent => "signal content link",
            Self::Content => "content",
            Self::ContentMedia => "content media",
            Self::Metric => "content metric",
            Self::WebsiteSnapshot => "website snapshot",
        }
    }

    /// Column list results are sorted on, newest first.
    #[must_use]
    pub fn order_column(self) -> &'static str {
        match self {
            Self::Brand | Self::Content | Self::SignalContent => "created_at",
            Self::Signal => "detected_at",
            Self::ContentMedia => "id",
            Self::Metric => "collected_at",
            Self::WebsiteSnapshot => "captured_at",
        }
    }

    #[must_use]
    pub fn order_descending(self) -> bool {
        !matches!(self, Self::ContentMedia)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A create payload for one record kind.
pub trait NewRecord: Serialize + DeserializeOwned {
    const KIND: RecordKind;

    /// Fields that must be present and non-null in the request body.
    const REQUIRED: &'static [&'static str];

    /// Semantic checks beyond presence and type.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every offending field.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Parse and validate a request body.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the body is not an object, a
    /// required field is absent, a value has the wrong type, or
    /// [`NewRecord::validate`] fails.
    fn parse(body: Value) -> Result<Self, ValidationError> {
        let record: Self = parse_payload(body, Self::REQUIRED)?;
        record.validate()?;
        Ok(record)
    }
}

fn parse_payload<T: DeserializeOwned>(
    body: Value,
    required: &[&str],
) -> Result<T, ValidationError> {
    let Value::Object(map) = &body else {
        return Err(ValidationError::single("body", "expected a JSON object"));
    };

    let mut errors = FieldErrors::default();
    for field in required {
        if map.get(*field).is_none_or(Value::is_null) {
            errors.push(*field, "field required");
        }
    }
    errors.finish()?;

    serde_json::from_value(body).map_err(|e| ValidationError::single("body", e.to_string()))
}

fn not_blank(errors: &mut FieldErrors, field: &str, value: &str) {
    errors.ensure(!value.trim().is_empty(), field, "must not be blank");
}

fn not_blank_opt(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        not_blank(errors, field, v);
    }
}

fn valid_url(errors: &mut FieldErrors, field: &str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(field, format!("must be a valid URL, got '{value}'"));
    }
}

fn valid_url_opt(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        valid_url(errors, field, v);
    }
}

fn non_negative(errors: &mut FieldErrors, field: &str, value: Option<i64>) {
    if let Some(v) = value {
        errors.ensure(v >= 0, field, "must not be negative");
    }
}
