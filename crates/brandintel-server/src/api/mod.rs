mod brands;
mod content;
mod signals;
mod snapshots;

#[cfg(test)]
mod tests;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use brandintel_core::{
    AppConfig, FieldError, FilterSchema, ListQuery, NewRecord, Page, RecordKind, ValidationError,
};
use brandintel_db::{Gateway, GatewayError, Rows};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    /// Rows matching the filters, when the database reported a count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
}

/// Raw query pairs, kept in order so repeated list parameters survive.
pub(super) type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Request body as untyped JSON; create payloads parse it field by field.
pub(super) type JsonBody = Result<Json<Value>, JsonRejection>;

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            pagination: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub(super) fn page(rows: Rows<T>, page: Page, request_id: String) -> Self {
        let mut meta = ResponseMeta::new(request_id);
        meta.pagination = Some(Pagination {
            total: rows.total,
            limit: page.limit,
            offset: page.offset,
        });
        Self {
            data: rows.items,
            meta,
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                fields: Vec::new(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub fn validation(request_id: impl Into<String>, error: ValidationError) -> Self {
        let mut api_error = Self::new(request_id, "validation_error", error.to_string());
        api_error.error.fields = error.fields;
        api_error
    }

    pub fn not_found(request_id: impl Into<String>, kind: RecordKind, id: &str) -> Self {
        Self::new(request_id, "not_found", format!("{kind} '{id}' not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_gateway_error(request_id: &str, error: GatewayError) -> ApiError {
    match error {
        GatewayError::NotFound { kind, id } => ApiError::not_found(request_id, kind, &id),
        GatewayError::Validation(e) => ApiError::validation(request_id, e),
        GatewayError::Service(e) => {
            tracing::error!(error = %e, request_id, "database request failed");
            ApiError::new(request_id, "internal_error", "database request failed")
        }
    }
}

/// Turns raw query pairs into a typed query for the route's filter schema.
pub(super) fn list_query(
    request_id: &str,
    schema: FilterSchema,
    params: QueryPairs,
) -> Result<ListQuery, ApiError> {
    let Query(pairs) =
        params.map_err(|e| ApiError::new(request_id, "bad_request", e.body_text()))?;
    ListQuery::from_params(schema, &pairs).map_err(|e| ApiError::validation(request_id, e))
}

/// Parses a create payload, reporting every missing or malformed field.
pub(super) fn parse_body<R: NewRecord>(request_id: &str, body: JsonBody) -> Result<R, ApiError> {
    let Json(value) =
        body.map_err(|e| ApiError::new(request_id, "bad_request", e.body_text()))?;
    R::parse(value).map_err(|e| ApiError::validation(request_id, e))
}

/// 404 unless a row of `kind` with identifier `id` exists.
pub(super) async fn ensure_exists(
    state: &AppState,
    request_id: &str,
    kind: RecordKind,
    id: &str,
) -> Result<(), ApiError> {
    let found = state
        .gateway
        .exists(kind, id)
        .await
        .map_err(|e| map_gateway_error(request_id, e))?;
    if found {
        Ok(())
    } else {
        Err(ApiError::not_found(request_id, kind, id))
    }
}

/// One page of `kind` rows matching `query`.
pub(super) async fn list_page<T: DeserializeOwned + Serialize>(
    state: &AppState,
    request_id: String,
    kind: RecordKind,
    query: ListQuery,
) -> Result<Json<ApiResponse<Vec<T>>>, ApiError> {
    let rows = state
        .gateway
        .list(kind, &query)
        .await
        .map_err(|e| map_gateway_error(&request_id, e))?;
    Ok(Json(ApiResponse::page(rows, query.page, request_id)))
}

/// One page of `kind` rows belonging to an existing parent record.
pub(super) async fn list_children<T: DeserializeOwned + Serialize>(
    state: &AppState,
    request_id: String,
    parent: (RecordKind, &str),
    kind: RecordKind,
    parent_field: &'static str,
    query: ListQuery,
) -> Result<Json<ApiResponse<Vec<T>>>, ApiError> {
    let (parent_kind, parent_id) = parent;
    ensure_exists(state, &request_id, parent_kind, parent_id).await?;
    let page = query.page;
    let rows = state
        .gateway
        .get_related(kind, parent_field, parent_id, query)
        .await
        .map_err(|e| map_gateway_error(&request_id, e))?;
    Ok(Json(ApiResponse::page(rows, page, request_id)))
}

fn build_cors(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring allowed origin that is not a valid header value");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_credentials(true)
}

fn v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/brands",
            get(brands::list_brands).post(brands::create_brand),
        )
        .route("/v1/brands/{id}", get(brands::get_brand))
        .route(
            "/v1/brands/{id}/signals",
            get(signals::list_brand_signals),
        )
        .route("/v1/brands/{id}/content", get(content::list_brand_content))
        .route(
            "/v1/brands/{id}/snapshots",
            get(snapshots::list_brand_snapshots),
        )
        .route(
            "/v1/brands/{id}/snapshots/latest",
            get(snapshots::latest_brand_snapshot),
        )
        .route(
            "/v1/signals",
            get(signals::list_signals).post(signals::create_signal),
        )
        .route("/v1/content", post(content::create_content))
        .route("/v1/content/{id}", get(content::get_content))
        .route("/v1/content/{id}/media", get(content::list_content_media))
        .route(
            "/v1/content/{id}/metrics",
            get(content::list_content_metrics).post(content::create_content_metric),
        )
        .route(
            "/v1/website-snapshots",
            post(snapshots::create_website_snapshot),
        )
}

pub fn build_app(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(v1_router())
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(cors))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            service: "Brand Intelligence API",
            timestamp: Utc::now(),
        },
        req_id.0,
    ))
}

async fn route_not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such route")
}
