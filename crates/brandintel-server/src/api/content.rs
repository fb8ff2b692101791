//! Content, media and metric handlers.
//!
//! - `POST /v1/content`                 create a content item with its media
//! - `GET  /v1/content/{id}`            one content item
//! - `GET  /v1/content/{id}/media`      media attached to a content item
//! - `GET  /v1/content/{id}/metrics`    engagement metrics, newest first
//! - `POST /v1/content/{id}/metrics`    record engagement metrics
//! - `GET  /v1/brands/{id}/content`     content for one brand

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use brandintel_core::{
    Content, ContentMedia, FilterSchema, Metric, NewContent, NewMetric, RecordKind,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    ensure_exists, list_children, list_query, map_gateway_error, parse_body, ApiError,
    ApiResponse, AppState, JsonBody, QueryPairs,
};

#[derive(Debug, Serialize)]
pub(super) struct CreatedContent {
    #[serde(flatten)]
    content: Content,
    media: Vec<ContentMedia>,
}

pub(super) async fn list_brand_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<Content>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::BRAND_CONTENT, params)?;
    list_children(
        &state,
        req_id.0,
        (RecordKind::Brand, &id),
        RecordKind::Content,
        "brand_id",
        query,
    )
    .await
}

pub(super) async fn get_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Content>>, ApiError> {
    let content: Content = state
        .gateway
        .get(RecordKind::Content, &id)
        .await
        .map_err(|e| map_gateway_error(&req_id.0, e))?;
    Ok(Json(ApiResponse::new(content, req_id.0)))
}

/// Inserts the content row, then its media rows pointing at it. A media
/// failure leaves the content row in place.
pub(super) async fn create_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<CreatedContent>>), ApiError> {
    let rid = &req_id.0;
    let mut content: NewContent = parse_body(rid, body)?;

    ensure_exists(&state, rid, RecordKind::Brand, &content.brand_id).await?;

    let created: Content = state
        .gateway
        .create(&content)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    for media in &mut content.media {
        media.content_id.clone_from(&created.id);
    }
    let media: Vec<ContentMedia> = state
        .gateway
        .create_many(&content.media)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    tracing::info!(
        content_id = %created.id,
        brand_id = %created.brand_id,
        platform = %created.platform,
        media = media.len(),
        "content created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            CreatedContent {
                content: created,
                media,
            },
            req_id.0,
        )),
    ))
}

pub(super) async fn list_content_media(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<ContentMedia>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::CONTENT_MEDIA, params)?;
    list_children(
        &state,
        req_id.0,
        (RecordKind::Content, &id),
        RecordKind::ContentMedia,
        "content_id",
        query,
    )
    .await
}

pub(super) async fn list_content_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<Metric>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::CONTENT_METRICS, params)?;
    list_children(
        &state,
        req_id.0,
        (RecordKind::Content, &id),
        RecordKind::Metric,
        "content_id",
        query,
    )
    .await
}

pub(super) async fn create_content_metric(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<Metric>>), ApiError> {
    let rid = &req_id.0;
    let mut metric: NewMetric = parse_body(rid, body)?;

    ensure_exists(&state, rid, RecordKind::Content, &id).await?;
    metric.content_id = id;

    let created: Metric = state
        .gateway
        .create(&metric)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    tracing::debug!(content_id = %created.content_id, "metric recorded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(created, req_id.0)),
    ))
}
