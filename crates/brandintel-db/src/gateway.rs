//! HTTP client for the hosted database's REST interface.
//!
//! Every call is one independent request: no caching, no retries, and no
//! grouping of writes. Rows are decoded into the caller's record type.

use std::time::Duration;

use brandintel_core::{AppConfig, Filter, ListQuery, NewRecord, Page, RecordKind, ValidationError};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE},
    Client, Response, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{GatewayError, ServiceError};
use crate::query::{parse_content_range, select_pairs};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One page of rows plus the number of rows matching the filters, when the
/// database reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rows<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

impl<T> Rows<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Some(0),
        }
    }
}

/// Gateway to the database's PostgREST endpoint (`{base}/rest/v1/{table}`).
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    rest_url: Url,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("rest_url", &self.rest_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Error body returned by PostgREST on failure.
#[derive(Debug, Deserialize)]
struct DbErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// A non-success answer from the database, not yet classified.
#[derive(Debug)]
struct DbFailure {
    table: &'static str,
    status: StatusCode,
    code: Option<String>,
    message: String,
}

impl DbFailure {
    /// `22P02`: a value could not be cast to the column type, e.g. a
    /// malformed UUID. Such a value can never match a row.
    fn is_invalid_text(&self) -> bool {
        self.code.as_deref() == Some("22P02")
    }

    /// `PGRST103` (HTTP 416): the requested offset lies past the last
    /// matching row.
    fn is_range_past_end(&self) -> bool {
        self.status == StatusCode::RANGE_NOT_SATISFIABLE
            || self.code.as_deref() == Some("PGRST103")
    }

    fn into_error(self) -> GatewayError {
        let field = column_from_message(&self.message).unwrap_or_else(|| "body".to_owned());
        match self.code.as_deref() {
            Some("22P02" | "22007" | "22008") => {
                ValidationError::single(field, "invalid value").into()
            }
            Some("23502") => ValidationError::single(field, "field required").into(),
            Some("23514") => ValidationError::single(field, "violates a check constraint").into(),
            Some("23503") => {
                ValidationError::single("reference", "referenced record does not exist").into()
            }
            _ => ServiceError::Rejected {
                table: self.table,
                status: self.status.as_u16(),
                code: self.code,
                message: self.message,
            }
            .into(),
        }
    }
}

impl Gateway {
    /// Creates a gateway from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the key is not a valid header
    /// value, or [`ServiceError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.database_url.as_str(),
            &config.database_key,
            config.db_timeout_secs,
        )
    }

    /// Creates a gateway for `base_url` (a project URL, or a mock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the URL or key is unusable, or
    /// [`ServiceError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, GatewayError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| ServiceError::Config("database key is not a valid header value".into()))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ServiceError::Config("database key is not a valid header value".into()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let timeout = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandintel/0.1")
            .build()?;

        let normalised = format!("{}/rest/v1/", base_url.trim_end_matches('/'));
        let rest_url = Url::parse(&normalised).map_err(|e| {
            ServiceError::Config(format!("invalid database URL '{base_url}': {e}"))
        })?;

        Ok(Self { client, rest_url })
    }

    /// Lists rows of `kind` matching `query`, newest first.
    ///
    /// A filter value the database cannot cast to the column type matches
    /// nothing and yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Service`] when the database is unreachable,
    /// rejects the request, or returns rows that do not decode as `T`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        query: &ListQuery,
    ) -> Result<Rows<T>, GatewayError> {
        self.select(kind, &select_pairs(kind, query), true).await
    }

    /// Lists rows of `kind` whose `parent_field` equals `parent_id`, with
    /// any further filters from `query`.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::list`].
    pub async fn get_related<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        parent_field: &'static str,
        parent_id: &str,
        query: ListQuery,
    ) -> Result<Rows<T>, GatewayError> {
        let query = query.with_filter(Filter::eq(parent_field, parent_id));
        self.list(kind, &query).await
    }

    /// Fetches the row of `kind` with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when no row matches, or
    /// [`GatewayError::Service`] on database failure.
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<T, GatewayError> {
        let query = ListQuery {
            filters: vec![Filter::eq("id", id)],
            page: Page {
                limit: 1,
                offset: 0,
            },
        };
        let rows: Rows<T> = self.select(kind, &select_pairs(kind, &query), false).await?;
        rows.items
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound {
                kind,
                id: id.to_owned(),
            })
    }

    /// Whether a row of `kind` with identifier `id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Service`] on database failure.
    pub async fn exists(&self, kind: RecordKind, id: &str) -> Result<bool, GatewayError> {
        let pairs = [
            ("select".to_owned(), "id".to_owned()),
            ("id".to_owned(), format!("eq.{id}")),
            ("limit".to_owned(), "1".to_owned()),
        ];
        let rows: Rows<serde_json::Value> = self.select(kind, &pairs, false).await?;
        Ok(!rows.items.is_empty())
    }

    /// Validates `record` and inserts it, returning the row the database
    /// produced (with its generated identifier and timestamp).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the record is malformed or
    /// the database rejects it as such, or [`GatewayError::Service`] on
    /// database failure.
    pub async fn create<R: NewRecord, T: DeserializeOwned>(
        &self,
        record: &R,
    ) -> Result<T, GatewayError> {
        record.validate()?;
        let mut rows: Vec<T> = self.insert(R::KIND, record).await?;
        if rows.len() == 1 {
            if let Some(row) = rows.pop() {
                return Ok(row);
            }
        }
        Err(ServiceError::Rejected {
            table: R::KIND.table(),
            status: StatusCode::OK.as_u16(),
            code: None,
            message: format!("insert returned {} rows, expected 1", rows.len()),
        }
        .into())
    }

    /// Validates and inserts `records` in one request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] naming `[index].field` for each
    /// malformed record, or [`GatewayError::Service`] on database failure.
    pub async fn create_many<R: NewRecord, T: DeserializeOwned>(
        &self,
        records: &[R],
    ) -> Result<Vec<T>, GatewayError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut errors = brandintel_core::FieldErrors::default();
        for (index, record) in records.iter().enumerate() {
            if let Err(e) = record.validate() {
                for field in e.fields {
                    errors.push(format!("[{index}].{}", field.field), field.message);
                }
            }
        }
        errors.finish()?;

        self.insert(R::KIND, records).await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        pairs: &[(String, String)],
        count: bool,
    ) -> Result<Rows<T>, GatewayError> {
        let mut request = self.table_url(kind).map(|url| self.client.get(url).query(pairs))?;
        if count {
            request = request.header("Prefer", "count=exact");
        }
        let response = request.send().await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let response = match check(kind, response).await? {
            Ok(response) => response,
            Err(failure) if failure.is_invalid_text() => {
                tracing::debug!(table = kind.table(), "filter value cannot match column type");
                return Ok(Rows::empty());
            }
            Err(failure) if failure.is_range_past_end() => {
                tracing::debug!(table = kind.table(), ?total, "offset past last row");
                return Ok(Rows {
                    items: Vec::new(),
                    total,
                });
            }
            Err(failure) => return Err(failure.into_error()),
        };

        let items: Vec<T> = decode(kind, response).await?;
        tracing::debug!(table = kind.table(), rows = items.len(), ?total, "selected rows");
        Ok(Rows { items, total })
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        body: &B,
    ) -> Result<Vec<T>, GatewayError> {
        let url = self.table_url(kind)?;
        let response = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = check(kind, response).await?.map_err(DbFailure::into_error)?;
        let rows: Vec<T> = decode(kind, response).await?;
        tracing::debug!(table = kind.table(), rows = rows.len(), "inserted rows");
        Ok(rows)
    }

    fn table_url(&self, kind: RecordKind) -> Result<Url, GatewayError> {
        self.rest_url.join(kind.table()).map_err(|e| {
            ServiceError::Config(format!("cannot build URL for {}: {e}", kind.table())).into()
        })
    }
}

/// Splits a response into success, or a classified database failure.
///
/// The outer `Result` carries transport errors while reading the body.
async fn check(
    kind: RecordKind,
    response: Response,
) -> Result<Result<Response, DbFailure>, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(Ok(response));
    }

    let text = response.text().await?;
    let body: Option<DbErrorBody> = serde_json::from_str(&text).ok();
    let (code, message) = match body {
        Some(b) => (b.code, b.message.unwrap_or_else(|| text.clone())),
        None => (None, text),
    };
    tracing::warn!(
        table = kind.table(),
        status = status.as_u16(),
        code = code.as_deref().unwrap_or("-"),
        "database request failed"
    );
    Ok(Err(DbFailure {
        table: kind.table(),
        status,
        code,
        message,
    }))
}

async fn decode<T: DeserializeOwned>(
    kind: RecordKind,
    response: Response,
) -> Result<T, GatewayError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ServiceError::Decode {
            context: format!("{} rows", kind.table()),
            source: e,
        }
        .into()
    })
}

/// Pulls the column name out of messages like
/// `null value in column "name" of relation "brands" ...`.
fn column_from_message(message: &str) -> Option<String> {
    let rest = &message[message.find("column \"")? + "column \"".len()..];
    let end = rest.find('"')?;
    Some(rest[..end].to_owned())
}
