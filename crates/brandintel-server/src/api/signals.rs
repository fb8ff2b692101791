//! Signal handlers.
//!
//! - `GET  /v1/signals`               signals across all brands
//! - `POST /v1/signals`               create a signal and link its content
//! - `GET  /v1/brands/{id}/signals`   signals for one brand

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use brandintel_core::{
    FilterSchema, NewSignal, NewSignalContent, RecordKind, Signal, SignalContent,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    ensure_exists, list_children, list_page, list_query, map_gateway_error, parse_body, ApiError,
    ApiResponse, AppState, JsonBody, QueryPairs,
};

#[derive(Debug, Serialize)]
pub(super) struct CreatedSignal {
    #[serde(flatten)]
    signal: Signal,
    content_ids: Vec<String>,
}

pub(super) async fn list_signals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<Signal>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::SIGNALS, params)?;
    list_page(&state, req_id.0, RecordKind::Signal, query).await
}

pub(super) async fn list_brand_signals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    params: QueryPairs,
) -> Result<Json<ApiResponse<Vec<Signal>>>, ApiError> {
    let query = list_query(&req_id.0, FilterSchema::BRAND_SIGNALS, params)?;
    list_children(
        &state,
        req_id.0,
        (RecordKind::Brand, &id),
        RecordKind::Signal,
        "brand_id",
        query,
    )
    .await
}

/// The brand and every linked content item must exist. Links are inserted
/// after the signal row, each content item once.
pub(super) async fn create_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<CreatedSignal>>), ApiError> {
    let rid = &req_id.0;
    let mut signal: NewSignal = parse_body(rid, body)?;
    signal.content_ids = unique(std::mem::take(&mut signal.content_ids));

    ensure_exists(&state, rid, RecordKind::Brand, &signal.brand_id).await?;
    for content_id in &signal.content_ids {
        ensure_exists(&state, rid, RecordKind::Content, content_id).await?;
    }

    let created: Signal = state
        .gateway
        .create(&signal)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    let links: Vec<NewSignalContent> = signal
        .content_ids
        .iter()
        .map(|content_id| NewSignalContent {
            signal_id: created.id.clone(),
            content_id: content_id.clone(),
        })
        .collect();
    let linked: Vec<SignalContent> = state
        .gateway
        .create_many(&links)
        .await
        .map_err(|e| map_gateway_error(rid, e))?;

    tracing::info!(
        signal_id = %created.id,
        brand_id = %created.brand_id,
        links = linked.len(),
        "signal created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            CreatedSignal {
                signal: created,
                content_ids: signal.content_ids,
            },
            req_id.0,
        )),
    ))
}

/// Drops repeated identifiers, keeping first occurrences in order.
fn unique(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keeps_first_occurrence_order() {
        let ids = vec!["c2".to_owned(), "c1".to_owned(), "c2".to_owned()];
        assert_eq!(unique(ids), ["c2", "c1"]);
    }
}
