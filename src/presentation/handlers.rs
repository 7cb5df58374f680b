// HTTP request handlers
use crate::domain::run::Run;
use crate::domain::snapshot::{Kind, StepKey};
use crate::infrastructure::event_stream::snapshot_events;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

// Check if the client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

/// List all runs in the log directory
pub async fn list_runs(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);

    let runs = match state.run_service.list_runs().await {
        Ok(runs) => runs,
        Err(e) => {
            tracing::error!("listing runs failed: {:#}", e);
            // Return an empty list on error
            Vec::<Run>::new()
        }
    };
    match json_response(&runs, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// The truncated snapshot of everything in the log directory
pub async fn snapshot(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let snapshot = state.refresh_service.snapshot().await;
    match json_response(&snapshot.truncated(), compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// A single full item, for everything the snapshot only references
pub async fn item(
    Path((kind, name, step, category)): Path<(String, String, String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let (Ok(kind), Ok(step)) = (kind.parse::<Kind>(), step.parse::<StepKey>()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let snapshot = state.refresh_service.snapshot().await;
    match snapshot.get(kind, &name, step, &category) {
        Some(item) => match json_response(item, accepts_brotli(&headers)).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Chart geometry and tooltip index for every scalar category
pub async fn charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let snapshot = state.refresh_service.snapshot().await;
    let charts = state.chart_service.build_charts(&snapshot);
    match json_response(&charts, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[derive(Deserialize)]
pub struct TooltipQuery {
    pub category: String,
    pub x: f64,
    pub y: f64,
}

/// Nearest-point tooltip lookup for a pointer position on a category chart
pub async fn chart_tooltip(
    Query(query): Query<TooltipQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let snapshot = state.refresh_service.snapshot().await;
    let Some(chart) = state.chart_service.build_chart(&snapshot, &query.category) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let column = chart.geometry.tooltip_at(
        &chart.tooltip,
        state.chart_service.area(),
        query.x,
        query.y,
    );
    match column {
        Some(column) => match json_response(&column, false).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        // Outside the plotted rectangle there is no tooltip.
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Server Sent Events pushing the truncated snapshot on every change
pub async fn events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_events(state.refresh_service.subscribe())
}
