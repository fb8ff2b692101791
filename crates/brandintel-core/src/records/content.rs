use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{not_blank, not_blank_opt, valid_url, valid_url_opt, NewRecord, RecordKind};
use crate::{FieldErrors, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Twitter,
}

impl Platform {
    pub const NAMES: &'static [&'static str] = &["instagram", "tiktok", "twitter"];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "instagram" => Some(Self::Instagram),
            "tiktok" => Some(Self::Tiktok),
            "twitter" => Some(Self::Twitter),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A social post scraped for a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub brand_id: String,
    pub platform: String,
    pub content_type: Option<String>,
    pub url: String,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub tagged_users: Option<Vec<String>>,
    /// When the post was published on the platform.
    pub created_at: DateTime<Utc>,
    pub inserted_at: DateTime<Utc>,
}

/// Image or video attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMedia {
    pub id: String,
    pub content_id: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_sec: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContent {
    pub brand_id: String,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagged_users: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    /// Inserted into `content_media` after the content row exists.
    #[serde(default, skip_serializing)]
    pub media: Vec<NewContentMedia>,
}

impl NewRecord for NewContent {
    const KIND: RecordKind = RecordKind::Content;
    const REQUIRED: &'static [&'static str] = &["brand_id", "platform", "url", "created_at"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        not_blank(&mut errors, "brand_id", &self.brand_id);
        if Platform::parse(&self.platform).is_none() {
            errors.push(
                "platform",
                format!("must be one of {}", Platform::NAMES.join(", ")),
            );
        }
        not_blank_opt(&mut errors, "content_type", self.content_type.as_deref());
        valid_url(&mut errors, "url", &self.url);
        for (index, media) in self.media.iter().enumerate() {
            if let Err(nested) = media.validate() {
                for field in nested.fields {
                    errors.push(format!("media[{index}].{}", field.field), field.message);
                }
            }
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContentMedia {
    /// Set from the parent content row, never read from the request body.
    #[serde(default, skip_deserializing)]
    pub content_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<i32>,
}

impl NewRecord for NewContentMedia {
    const KIND: RecordKind = RecordKind::ContentMedia;
    const REQUIRED: &'static [&'static str] = &[];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.ensure(
            self.image_url.is_some() || self.video_url.is_some(),
            "image_url",
            "either image_url or video_url is required",
        );
        valid_url_opt(&mut errors, "image_url", self.image_url.as_deref());
        valid_url_opt(&mut errors, "video_url", self.video_url.as_deref());
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("duration_sec", self.duration_sec),
        ] {
            super::non_negative(&mut errors, field, value.map(i64::from));
        }
        errors.finish()
    }
}
