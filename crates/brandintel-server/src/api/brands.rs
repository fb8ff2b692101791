//! Brand handlers.
//!
//! - `GET  /v1/brands`        filtered, paginated brand list
//! - `POST /v1/brands`        create a brand
//! - `GET  /v1/brands/{id}`   one brand, optionally with `include=content,signals`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use brandintel_core::{
    Brand, Content, FieldErrors, FilterSchema, ListQuery, NewBrand, RecordKind, Signal,
    ValidationError,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    list_page, list_query, map_gateway_error, parse_body, ApiError, ApiResponse, AppState,
    JsonBody, QueryPairs,
};

#[derive(Debug, Serialize)]
pub(super) struct BrandDetail {
    #[serde(flatten)]
    brand: Brand,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Vec<Content>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signals: Option<Vec<Signal>>,
}

/// Related lists a brand detail request may nest.
#[derive(Debug, Default, PartialEq, Eq)]
struct Includes {
    content: bool,
    signals: bool,
}

impl Includes {
    /// Reads `include` (repeatable, comma separated); any other parameter is rejected.
    fn from_params(pairs: &[(String, String)]) -> Result<Self, ValidationError> {
        let mut includes = Self::default();
        let mut errors = FieldErrors::default();
        for (key, value) in pairs {
            if key != "include" {
                errors.push(key.as_str(), "unknown parameter");
                continue;
            }
            for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match name {
                    "content" => includes.content = true,
                    "signals" => includes.signals = true,
                    other => errors.push(
                        "include",
                        format!("unknown include '{other}', expected content or signals"),
                    ),
                }
            }
        }
        errors.finish().map(|()| includes)
    }
}

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<Brand>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::BRANDS, params)?;
    list_page(&state, req_id.0, RecordKind::Brand, query).await
}

pub(super) async fn create_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<Brand>>), ApiError> {
    let brand: NewBrand = parse_body(&req_id.0, body)?;

    let created: Brand = state
        .gateway
        .create(&brand)
        .await
        .map_err(|e| map_gateway_error(&req_id.0, e))?;

    tracing::info!(brand_id = %created.id, "brand created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(created, req_id.0)),
    ))
}

/// Nested lists use the same default page as `/v1/brands/{id}/content` and
/// `/v1/brands/{id}/signals`.
pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<BrandDetail>>, ApiError> {
    let rid = &req_id.0;
    let Query(pairs) =
        params.map_err(|e| ApiError::new(rid, "bad_request", e.body_text()))?;
    let includes = Includes::from_params(&pairs).map_err(|e| ApiError::validation(rid, e))?;

    let brand: Brand = state
        .gateway
        .get(RecordKind::Brand, &id)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    let content = if includes.content {
        let rows = state
            .gateway
            .get_related::<Content>(RecordKind::Content, "brand_id", &id, ListQuery::default())
            .await
            .map_err(|e| map_gateway_error(rid, e))?;
        Some(rows.items)
    } else {
        None
    };

    let signals = if includes.signals {
        let rows = state
            .gateway
            .get_related::<Signal>(RecordKind::Signal, "brand_id", &id, ListQuery::default())
            .await
            .map_err(|e| map_gateway_error(rid, e))?;
        Some(rows.items)
    } else {
        None
    };

    Ok(Json(ApiResponse::new(
        BrandDetail {
            brand,
            content,
            signals,
        },
        req_id.0,
    )))
}
