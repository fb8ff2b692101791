//! Per-route filter schemas and the typed list query they produce.
//!
//! A list route accepts only the query parameters its [`FilterSchema`] names,
//! plus `limit` and `offset`. Each recognized parameter maps to one column, one
//! comparison operator, and one expected value type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::records::Platform;
use crate::{FieldErrors, ValidationError};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// Case-insensitive substring match.
    ILike,
    /// Array column contains the value.
    Contains,
    /// Column equals any of the values.
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// RFC 3339 timestamp; a bare date means midnight UTC.
    Timestamp,
    OneOf(&'static [&'static str]),
    /// Repeated parameter or comma-separated values.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
    pub kind: ValueKind,
}

impl FilterField {
    const fn new(param: &'static str, column: &'static str, op: FilterOp, kind: ValueKind) -> Self {
        Self {
            param,
            column,
            op,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSchema(pub &'static [FilterField]);

impl FilterSchema {
    pub const BRANDS: Self = Self(&[
        FilterField::new("search", "name", FilterOp::ILike, ValueKind::Text),
        FilterField::new("industry", "industry", FilterOp::Eq, ValueKind::Text),
        FilterField::new("market", "market", FilterOp::Eq, ValueKind::Text),
        FilterField::new("tier", "tier", FilterOp::Eq, ValueKind::Text),
        FilterField::new("aesthetic", "aesthetic", FilterOp::Contains, ValueKind::Text),
        FilterField::new("ids", "id", FilterOp::In, ValueKind::List),
    ]);

    pub const SIGNALS: Self = Self(&[
        FilterField::new("signal_type", "signal_type", FilterOp::Eq, ValueKind::Text),
        FilterField::new("brand_id", "brand_id", FilterOp::Eq, ValueKind::Text),
        FilterField::new("since", "detected_at", FilterOp::Gte, ValueKind::Timestamp),
        FilterField::new("until", "detected_at", FilterOp::Lte, ValueKind::Timestamp),
    ]);

    pub const BRAND_SIGNALS: Self = Self(&[
        FilterField::new("signal_type", "signal_type", FilterOp::Eq, ValueKind::Text),
        FilterField::new("since", "detected_at", FilterOp::Gte, ValueKind::Timestamp),
        FilterField::new("until", "detected_at", FilterOp::Lte, ValueKind::Timestamp),
    ]);

    pub const BRAND_CONTENT: Self = Self(&[
        FilterField::new(
            "platform",
            "platform",
            FilterOp::Eq,
            ValueKind::OneOf(Platform::NAMES),
        ),
        FilterField::new("content_type", "content_type", FilterOp::Eq, ValueKind::Text),
        FilterField::new("since", "created_at", FilterOp::Gte, ValueKind::Timestamp),
    ]);

    pub const CONTENT_MEDIA: Self = Self(&[]);

    pub const CONTENT_METRICS: Self = Self(&[FilterField::new(
        "since",
        "collected_at",
        FilterOp::Gte,
        ValueKind::Timestamp,
    )]);

    pub const BRAND_SNAPSHOTS: Self = Self(&[FilterField::new(
        "since",
        "captured_at",
        FilterOp::Gte,
        ValueKind::Timestamp,
    )]);

    #[must_use]
    pub fn field(&self, param: &str) -> Option<&'static FilterField> {
        self.0.iter().find(|f| f.param == param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    List(Vec<String>),
}

impl FilterValue {
    /// Plain-text rendering; lists are rendered by the caller.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(v) => v.clone(),
            Self::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::List(values) => values.join(","),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            op: FilterOp::Eq,
            value: FilterValue::Text(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    /// Clamp a requested page into `1..=MAX_PAGE_SIZE` rows from a non-negative offset.
    #[must_use]
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE));
        let offset = offset.unwrap_or(0).max(0);
        Self {
            limit: u32::try_from(limit).unwrap_or(DEFAULT_PAGE_SIZE),
            offset: u32::try_from(offset).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub page: Page,
}

impl ListQuery {
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.insert(0, filter);
        self
    }

    /// Build a query from raw URL query pairs, accepting only what `schema` names.
    ///
    /// Blank values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming every unknown parameter, malformed
    /// value, or non-list parameter given more than once.
    pub fn from_params(
        schema: FilterSchema,
        params: &[(String, String)],
    ) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();
        let mut filters: Vec<Filter> = Vec::new();
        let mut limit = None;
        let mut offset = None;
        let mut seen: Vec<&str> = Vec::new();

        for (key, raw) in params {
            let value = raw.trim();
            let key = key.as_str();

            if key == "limit" || key == "offset" {
                if value.is_empty() {
                    continue;
                }
                if seen.contains(&key) {
                    errors.push(key, "may only be given once");
                    continue;
                }
                seen.push(key);
                match value.parse::<i64>() {
                    Ok(n) if key == "limit" => limit = Some(n),
                    Ok(n) => offset = Some(n),
                    Err(_) => errors.push(key, "must be an integer"),
                }
                continue;
            }

            let Some(field) = schema.field(key) else {
                errors.push(key, "unknown filter");
                continue;
            };
            if value.is_empty() {
                continue;
            }

            if field.kind == ValueKind::List {
                let items = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned);
                if let Some(FilterValue::List(existing)) = filters
                    .iter_mut()
                    .find(|f| f.column == field.column && f.op == field.op)
                    .map(|f| &mut f.value)
                {
                    existing.extend(items);
                } else {
                    filters.push(Filter {
                        column: field.column,
                        op: field.op,
                        value: FilterValue::List(items.collect()),
                    });
                }
                continue;
            }

            if seen.contains(&field.param) {
                errors.push(key, "may only be given once");
                continue;
            }
            seen.push(field.param);

            match parse_value(field.kind, value) {
                Ok(value) => filters.push(Filter {
                    column: field.column,
                    op: field.op,
                    value,
                }),
                Err(message) => errors.push(key, message),
            }
        }

        errors.finish()?;
        Ok(Self {
            filters,
            page: Page::clamped(limit, offset),
        })
    }
}

fn parse_value(kind: ValueKind, value: &str) -> Result<FilterValue, String> {
    match kind {
        ValueKind::Text => Ok(FilterValue::Text(value.to_owned())),
        ValueKind::Timestamp => parse_timestamp(value)
            .map(FilterValue::Timestamp)
            .ok_or_else(|| format!("must be an ISO-8601 timestamp, got '{value}'")),
        ValueKind::OneOf(allowed) => {
            if allowed.contains(&value) {
                Ok(FilterValue::Text(value.to_owned()))
            } else {
                Err(format!("must be one of {}", allowed.join(", ")))
            }
        }
        ValueKind::List => Ok(FilterValue::List(vec![value.to_owned()])),
    }
}

/// Accepts RFC 3339, a naive date-time (read as UTC), or a bare date.
///
/// An unencoded `+` in a query string arrives as a space, so a space before
/// the offset is read back as `+`.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some((head, tail)) = value.rsplit_once(' ') {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&format!("{head}+{tail}")) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(Page::clamped(None, None), Page { limit: 20, offset: 0 });
        assert_eq!(Page::clamped(Some(0), Some(-5)), Page { limit: 1, offset: 0 });
        assert_eq!(Page::clamped(Some(1_000), Some(40)), Page { limit: 100, offset: 40 });
    }

    #[test]
    fn brand_filters_map_to_columns_and_operators() {
        let query = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("search", "Nike"), ("industry", "Sports"), ("limit", "5")]),
        )
        .unwrap();

        assert_eq!(query.page.limit, 5);
        assert_eq!(
            query.filters,
            vec![
                Filter {
                    column: "name",
                    op: FilterOp::ILike,
                    value: FilterValue::Text("Nike".into()),
                },
                Filter::eq("industry", "Sports"),
            ]
        );
    }

    #[test]
    fn unknown_parameters_are_rejected_by_name() {
        let err = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("industry", "Sports"), ("color", "red"), ("drop_table", "x")]),
        )
        .unwrap_err();
        assert!(err.names("color"));
        assert!(err.names("drop_table"));
        assert!(!err.names("industry"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let query = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("industry", ""), ("market", "  "), ("limit", "")]),
        )
        .unwrap();
        assert!(query.filters.is_empty());
        assert_eq!(query.page, Page::default());
    }

    #[test]
    fn non_integer_limit_is_a_field_error() {
        let err = ListQuery::from_params(FilterSchema::SIGNALS, &pairs(&[("limit", "ten")]))
            .unwrap_err();
        assert!(err.names("limit"));
    }

    #[test]
    fn since_becomes_a_lower_bound_on_detected_at() {
        let query = ListQuery::from_params(
            FilterSchema::SIGNALS,
            &pairs(&[("since", "2023-10-24T00:00:00Z"), ("signal_type", "launch")]),
        )
        .unwrap();
        assert_eq!(
            query.filters[0],
            Filter {
                column: "detected_at",
                op: FilterOp::Gte,
                value: FilterValue::Timestamp(Utc.with_ymd_and_hms(2023, 10, 24, 0, 0, 0).unwrap()),
            }
        );
    }

    #[test]
    fn timestamp_forms_are_accepted() {
        let expected = Utc.with_ymd_and_hms(2023, 10, 24, 0, 0, 0).unwrap();
        for raw in [
            "2023-10-24",
            "2023-10-24T00:00:00",
            "2023-10-24T02:00:00+02:00",
            "2023-10-24T02:00:00 02:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn malformed_since_is_rejected() {
        let err = ListQuery::from_params(FilterSchema::SIGNALS, &pairs(&[("since", "last week")]))
            .unwrap_err();
        assert!(err.names("since"));
    }

    #[test]
    fn platform_must_be_known() {
        let err = ListQuery::from_params(
            FilterSchema::BRAND_CONTENT,
            &pairs(&[("platform", "myspace")]),
        )
        .unwrap_err();
        assert!(err.names("platform"));
    }

    #[test]
    fn nested_schemas_do_not_accept_the_parent_field() {
        let err = ListQuery::from_params(
            FilterSchema::BRAND_SIGNALS,
            &pairs(&[("brand_id", "other-brand")]),
        )
        .unwrap_err();
        assert!(err.names("brand_id"));
    }

    #[test]
    fn ids_accumulate_across_repeats_and_commas() {
        let query = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("ids", "a, b"), ("ids", "c")]),
        )
        .unwrap();
        assert_eq!(
            query.filters,
            vec![Filter {
                column: "id",
                op: FilterOp::In,
                value: FilterValue::List(vec!["a".into(), "b".into(), "c".into()]),
            }]
        );
    }

    #[test]
    fn scalar_filters_may_not_repeat() {
        let err = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("tier", "luxury"), ("tier", "premium")]),
        )
        .unwrap_err();
        assert!(err.names("tier"));
    }

    #[test]
    fn page_parameters_may_not_repeat() {
        let err = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("limit", "5"), ("limit", "50"), ("offset", "0"), ("offset", "10")]),
        )
        .unwrap_err();
        assert!(err.names("limit"));
        assert!(err.names("offset"));
        assert_eq!(err.fields[0].message, "may only be given once");

        let query = ListQuery::from_params(
            FilterSchema::BRANDS,
            &pairs(&[("limit", ""), ("limit", "5")]),
        )
        .unwrap();
        assert_eq!(query.page.limit, 5);
    }

    #[test]
    fn with_filter_puts_parent_filter_first() {
        let query = ListQuery::from_params(
            FilterSchema::BRAND_CONTENT,
            &pairs(&[("platform", "tiktok")]),
        )
        .unwrap()
        .with_filter(Filter::eq("brand_id", "b-1"));
        assert_eq!(query.filters[0], Filter::eq("brand_id", "b-1"));
        assert_eq!(query.filters.len(), 2);
    }
}
