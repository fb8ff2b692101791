//! HTTP client for the Brand Intelligence API.
//!
//! Unwraps the `{ data, meta }` envelope on success and turns the
//! `{ error: { code, message } }` envelope into [`DashboardError::Api`].

use std::time::Duration;

use brandintel_core::{Brand, Content, NewBrand, NewSignal, Signal};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ApiFieldError, DashboardError};

/// Liveness payload from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandFilters {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub market: Option<String>,
    pub tier: Option<String>,
    pub aesthetic: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalFilters {
    pub signal_type: Option<String>,
    pub brand_id: Option<String>,
    pub since: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilters {
    pub platform: Option<String>,
    pub content_type: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<PaginationMeta>,
}

#[derive(Debug, Deserialize)]
struct PaginationMeta {
    total: Option<u64>,
    limit: u32,
    offset: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    fields: Vec<ApiFieldError>,
}

/// Query pairs for the given optional filters, skipping unset and blank values.
fn query_pairs(
    filters: &[(&'static str, Option<&str>)],
    limit: u32,
    offset: u32,
) -> Vec<(&'static str, String)> {
    let mut pairs: Vec<(&'static str, String)> = filters
        .iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v.to_owned()))
        })
        .collect();
    pairs.push(("limit", limit.to_string()));
    pairs.push(("offset", offset.to_string()));
    pairs
}

impl BrandFilters {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        query_pairs(
            &[
                ("search", self.search.as_deref()),
                ("industry", self.industry.as_deref()),
                ("market", self.market.as_deref()),
                ("tier", self.tier.as_deref()),
                ("aesthetic", self.aesthetic.as_deref()),
            ],
            self.limit,
            self.offset,
        )
    }
}

impl SignalFilters {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        query_pairs(
            &[
                ("signal_type", self.signal_type.as_deref()),
                ("brand_id", self.brand_id.as_deref()),
                ("since", self.since.as_deref()),
            ],
            self.limit,
            self.offset,
        )
    }
}

impl ContentFilters {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        query_pairs(
            &[
                ("platform", self.platform.as_deref()),
                ("content_type", self.content_type.as_deref()),
            ],
            self.limit,
            self.offset,
        )
    }
}

/// Client for the Brand Intelligence API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DashboardError::InvalidUrl`] if `base_url`
    /// is not a valid base URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandintel-dashboard/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| DashboardError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(DashboardError::InvalidUrl {
                url: base_url.to_owned(),
                reason: "not a base URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// # Errors
    ///
    /// Returns [`DashboardError`] when the API is unreachable or unhealthy.
    pub async fn health(&self) -> Result<Health, DashboardError> {
        let url = self.url(&["health"])?;
        let envelope: Envelope<Health> = self.get(url, &[], "health").await?;
        Ok(envelope.data)
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::Api`] when the API rejects the filters, or
    /// another [`DashboardError`] on transport or decoding failure.
    pub async fn list_brands(
        &self,
        filters: &BrandFilters,
    ) -> Result<Listing<Brand>, DashboardError> {
        let url = self.url(&["v1", "brands"])?;
        let envelope = self.get(url, &filters.pairs(), "brand list").await?;
        Ok(listing(envelope))
    }

    /// # Errors
    ///
    /// Same as [`ApiClient::list_brands`].
    pub async fn list_signals(
        &self,
        filters: &SignalFilters,
    ) -> Result<Listing<Signal>, DashboardError> {
        let url = self.url(&["v1", "signals"])?;
        let envelope = self.get(url, &filters.pairs(), "signal list").await?;
        Ok(listing(envelope))
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::Api`] with code `not_found` when the brand
    /// does not exist; otherwise as [`ApiClient::list_brands`].
    pub async fn brand_content(
        &self,
        brand_id: &str,
        filters: &ContentFilters,
    ) -> Result<Listing<Content>, DashboardError> {
        let url = self.url(&["v1", "brands", brand_id, "content"])?;
        let envelope = self.get(url, &filters.pairs(), "content list").await?;
        Ok(listing(envelope))
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::Api`] with code `validation_error` when the
    /// API rejects the payload.
    pub async fn create_brand(&self, brand: &NewBrand) -> Result<Brand, DashboardError> {
        let url = self.url(&["v1", "brands"])?;
        let envelope: Envelope<Brand> = self.post(url, brand, "created brand").await?;
        Ok(envelope.data)
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::Api`] when the payload is invalid or the
    /// brand does not exist.
    pub async fn create_signal(&self, signal: &NewSignal) -> Result<Signal, DashboardError> {
        let url = self.url(&["v1", "signals"])?;
        let envelope: Envelope<Signal> = self.post(url, signal, "created signal").await?;
        Ok(envelope.data)
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, DashboardError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DashboardError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
        context: &str,
    ) -> Result<Envelope<T>, DashboardError> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).query(query).send().await?;
        read_envelope(response, context).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        context: &str,
    ) -> Result<Envelope<T>, DashboardError> {
        tracing::debug!(url = %url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        read_envelope(response, context).await
    }
}

fn listing<T>(envelope: Envelope<Vec<T>>) -> Listing<T> {
    let (total, limit, offset) = envelope.meta.pagination.map_or_else(
        || (None, u32::try_from(envelope.data.len()).unwrap_or(u32::MAX), 0),
        |p| (p.total, p.limit, p.offset),
    );
    Listing {
        items: envelope.data,
        total,
        limit,
        offset,
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<Envelope<T>, DashboardError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => DashboardError::Api {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
                fields: envelope.error.fields,
            },
            Err(_) => DashboardError::Api {
                status: status.as_u16(),
                code: format!("http_{}", status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
                fields: Vec::new(),
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| DashboardError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_not_sent() {
        let filters = BrandFilters {
            search: Some("  ".to_owned()),
            industry: Some("Sports".to_owned()),
            limit: 20,
            ..BrandFilters::default()
        };
        assert_eq!(
            filters.pairs(),
            [
                ("industry", "Sports".to_owned()),
                ("limit", "20".to_owned()),
                ("offset", "0".to_owned()),
            ]
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let client = ApiClient::new("http://localhost:8001/", 5).unwrap();
        let url = client.url(&["v1", "brands", "a/b c", "content"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/v1/brands/a%2Fb%20c/content"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = ApiClient::new("https://example.com/api", 5).unwrap();
        assert_eq!(
            client.url(&["health"]).unwrap().as_str(),
            "https://example.com/api/health"
        );
    }

    #[test]
    fn relative_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("localhost-without-scheme", 5),
            Err(DashboardError::InvalidUrl { .. })
        ));
    }
}
