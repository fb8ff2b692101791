//! Website snapshot handlers.
//!
//! - `POST /v1/website-snapshots`            capture a snapshot
//! - `GET  /v1/brands/{id}/snapshots`        snapshots for one brand, newest first
//! - `GET  /v1/brands/{id}/snapshots/latest` the newest snapshot for one brand

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use brandintel_core::{
    FilterSchema, ListQuery, NewWebsiteSnapshot, Page, RecordKind, WebsiteSnapshot,
};

use crate::middleware::RequestId;

use super::{
    ensure_exists, list_children, list_query, map_gateway_error, parse_body, ApiError,
    ApiResponse, AppState, JsonBody, QueryPairs,
};

pub(super) async fn create_website_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<WebsiteSnapshot>>), ApiError> {
    let rid = &req_id.0;
    let snapshot: NewWebsiteSnapshot = parse_body(rid, body)?;

    ensure_exists(&state, rid, RecordKind::Brand, &snapshot.brand_id).await?;

    let created: WebsiteSnapshot = state
        .gateway
        .create(&snapshot)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    tracing::info!(
        snapshot_id = %created.id,
        brand_id = %created.brand_id,
        "website snapshot captured"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(created, req_id.0)),
    ))
}

pub(super) async fn list_brand_snapshots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<WebsiteSnapshot>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::BRAND_SNAPSHOTS, params)?;
    list_children(
        &state,
        req_id.0,
        (RecordKind::Brand, &id),
        RecordKind::WebsiteSnapshot,
        "brand_id",
        query,
    )
    .await
}

pub(super) async fn latest_brand_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WebsiteSnapshot>>, ApiError> {
    let rid = &req_id.0;
    ensure_exists(&state, rid, RecordKind::Brand, &id).await?;

    let newest = ListQuery {
        filters: Vec::new(),
        page: Page {
            limit: 1,
            offset: 0,
        },
    };
    let rows = state
        .gateway
        .get_related::<WebsiteSnapshot>(RecordKind::WebsiteSnapshot, "brand_id", &id, newest)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    let snapshot = rows.items.into_iter().next().ok_or_else(|| {
        ApiError::new(
            rid,
            "not_found",
            format!("no website snapshots for brand '{id}'"),
        )
    })?;
    Ok(Json(ApiResponse::new(snapshot, req_id.0)))
}
