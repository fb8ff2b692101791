//! Subcommand runners: fetch through [`ApiClient`] and print tables.

use brandintel_core::{NewBrand, NewSignal};
use brandintel_dashboard::{render, ApiClient, BrandFilters, ContentFilters, SignalFilters};
use chrono::{Duration, SecondsFormat, Utc};

/// Health check plus brand and last-week signal counts.
///
/// # Errors
///
/// Returns an error if the API is unreachable or rejects a request.
pub(crate) async fn run_overview(client: &ApiClient) -> anyhow::Result<()> {
    let health = client.health().await?;
    println!("{}", render::health(&health));

    let brands = client
        .list_brands(&BrandFilters {
            limit: 1,
            ..BrandFilters::default()
        })
        .await?;
    let week_ago = (Utc::now() - Duration::days(7)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let signals = client
        .list_signals(&SignalFilters {
            since: Some(week_ago),
            limit: 1,
            ..SignalFilters::default()
        })
        .await?;

    println!();
    println!("{:<22}{}", "Brands", count(brands.total));
    println!("{:<22}{}", "Signals (last 7 days)", count(signals.total));
    Ok(())
}

fn count(total: Option<u64>) -> String {
    total.map_or_else(|| "unknown".to_owned(), |t| t.to_string())
}

/// # Errors
///
/// Returns an error if the API is unreachable or rejects the filters.
pub(crate) async fn run_brands(client: &ApiClient, filters: &BrandFilters) -> anyhow::Result<()> {
    let listing = client.list_brands(filters).await?;
    if listing.items.is_empty() {
        println!("no brands found");
        return Ok(());
    }
    println!("{}", render::brands_table(&listing.items));
    println!("{}", render::footer(&listing));
    Ok(())
}

/// # Errors
///
/// Returns an error if the API is unreachable or rejects the filters.
pub(crate) async fn run_signals(
    client: &ApiClient,
    filters: &SignalFilters,
) -> anyhow::Result<()> {
    let listing = client.list_signals(filters).await?;
    if listing.items.is_empty() {
        println!("no signals found");
        return Ok(());
    }
    println!("{}", render::signals_table(&listing.items));
    println!("{}", render::footer(&listing));
    Ok(())
}

/// # Errors
///
/// Returns an error if the brand does not exist or the API is unreachable.
pub(crate) async fn run_content(
    client: &ApiClient,
    brand_id: &str,
    filters: &ContentFilters,
) -> anyhow::Result<()> {
    let listing = client.brand_content(brand_id, filters).await?;
    if listing.items.is_empty() {
        println!("no content found for brand '{brand_id}'");
        return Ok(());
    }
    println!("{}", render::content_table(&listing.items));
    println!("{}", render::footer(&listing));
    Ok(())
}

/// # Errors
///
/// Returns an error if the API rejects the brand.
pub(crate) async fn run_create_brand(client: &ApiClient, brand: &NewBrand) -> anyhow::Result<()> {
    let created = client.create_brand(brand).await?;
    println!("brand created");
    println!(
        "{}",
        render::record(&[
            ("id", created.id),
            ("name", created.name),
            ("industry", created.industry.unwrap_or_default()),
            ("market", created.market.unwrap_or_default()),
            ("tier", created.tier.unwrap_or_default()),
            ("created", created.created_at.to_rfc3339()),
        ])
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the API rejects the signal or the brand is unknown.
pub(crate) async fn run_create_signal(
    client: &ApiClient,
    signal: &NewSignal,
) -> anyhow::Result<()> {
    let created = client.create_signal(signal).await?;
    println!("signal created");
    println!(
        "{}",
        render::record(&[
            ("id", created.id),
            ("brand", created.brand_id),
            ("type", created.signal_type),
            ("confidence", format!("{:.2}", created.confidence)),
            ("detected", created.detected_at.to_rfc3339()),
        ])
    );
    Ok(())
}
