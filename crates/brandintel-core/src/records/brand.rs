use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{not_blank, not_blank_opt, valid_url_opt, NewRecord, RecordKind};
use crate::{FieldErrors, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub industry: Option<String>,
    pub market: Option<String>,
    pub tier: Option<String>,
    pub aesthetic: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aesthetic: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl NewRecord for NewBrand {
    const KIND: RecordKind = RecordKind::Brand;
    const REQUIRED: &'static [&'static str] = &["name"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        not_blank(&mut errors, "name", &self.name);
        if self.name.chars().count() > 200 {
            errors.push("name", "must be at most 200 characters");
        }
        not_blank_opt(&mut errors, "industry", self.industry.as_deref());
        not_blank_opt(&mut errors, "market", self.market.as_deref());
        not_blank_opt(&mut errors, "tier", self.tier.as_deref());
        valid_url_opt(&mut errors, "logo_url", self.logo_url.as_deref());
        if let Some(tags) = &self.aesthetic {
            errors.ensure(
                tags.iter().all(|t| !t.trim().is_empty()),
                "aesthetic",
                "tags must not be blank",
            );
        }
        errors.finish()
    }
}
