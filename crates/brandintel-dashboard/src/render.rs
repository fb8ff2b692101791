//! Fixed-width text rendering for the dashboard's tables.

use brandintel_core::{Brand, Content, Signal};
use chrono::{DateTime, Utc};

use crate::client::{Health, Listing};

const EMPTY: &str = "-";

/// Shortens `value` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn opt(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(EMPTY)
}

fn fmt_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[must_use]
pub fn health(health: &Health) -> String {
    format!(
        "API status: {}\nService:    {}\nChecked at: {}",
        health.status,
        health.service,
        fmt_time(health.timestamp)
    )
}

/// "showing 21-40 of 57", or a plain count when the total is unknown.
#[must_use]
pub fn footer<T>(listing: &Listing<T>) -> String {
    let shown = listing.items.len();
    if shown == 0 {
        return match listing.total {
            Some(total) => format!("no rows at offset {} of {total}", listing.offset),
            None => "no rows".to_owned(),
        };
    }
    let first = u64::from(listing.offset) + 1;
    let last = u64::from(listing.offset) + shown as u64;
    match listing.total {
        Some(total) => format!("showing {first}-{last} of {total}"),
        None => format!("showing {first}-{last}"),
    }
}

#[must_use]
pub fn brands_table(brands: &[Brand]) -> String {
    let mut lines = vec![format!(
        "{:<38}{:<26}{:<14}{:<10}{:<10}AESTHETIC",
        "ID", "NAME", "INDUSTRY", "MARKET", "TIER"
    )];
    for brand in brands {
        let aesthetic = brand
            .aesthetic
            .as_ref()
            .filter(|tags| !tags.is_empty())
            .map_or_else(|| EMPTY.to_owned(), |tags| tags.join(", "));
        lines.push(format!(
            "{:<38}{:<26}{:<14}{:<10}{:<10}{}",
            brand.id,
            truncate(&brand.name, 24),
            truncate(opt(brand.industry.as_deref()), 12),
            truncate(opt(brand.market.as_deref()), 8),
            truncate(opt(brand.tier.as_deref()), 8),
            aesthetic
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn signals_table(signals: &[Signal]) -> String {
    let mut lines = vec![format!(
        "{:<20}{:<12}{:<38}{:<18}REASON",
        "TYPE", "CONFIDENCE", "BRAND", "DETECTED"
    )];
    for signal in signals {
        let confidence = format!("{:.0}%", signal.confidence * 100.0);
        lines.push(format!(
            "{:<20}{:<12}{:<38}{:<18}{}",
            truncate(&signal.signal_type, 18),
            confidence,
            signal.brand_id,
            fmt_time(signal.detected_at),
            truncate(opt(signal.reason.as_deref()), 60)
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn content_table(items: &[Content]) -> String {
    let mut lines = vec![format!(
        "{:<11}{:<8}{:<18}{:<46}CAPTION",
        "PLATFORM", "TYPE", "CREATED", "URL"
    )];
    for item in items {
        lines.push(format!(
            "{:<11}{:<8}{:<18}{:<46}{}",
            item.platform,
            truncate(opt(item.content_type.as_deref()), 7),
            fmt_time(item.created_at),
            truncate(&item.url, 44),
            truncate(opt(item.caption.as_deref()), 60)
        ));
    }
    lines.join("\n")
}

/// Key/value summary of a single created record.
#[must_use]
pub fn record(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 2;
    fields
        .iter()
        .map(|(key, value)| format!("{:<width$}{value}", format!("{key}:")))
        .collect::<Vec<_>>()
        .join("\n")
}
