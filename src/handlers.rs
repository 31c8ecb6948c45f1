use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::types::*;
use crate::AppState;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

fn backend_failure(message: String) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Search Engine API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "search": "POST /search",
            "health": "GET /health",
            "stats": "GET /stats",
        }
    }))
}

/// Always answers 200; a dead backend is reported in the body so callers
/// can tell "gateway up, backend down" apart from "gateway down".
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let reachable = state.backend.health().await;
    let status = if reachable { "healthy" } else { "unhealthy" };
    Json(HealthResponse {
        status: status.to_string(),
        backend_reachable: reachable,
        timestamp: Utc::now().timestamp(),
    })
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.backend.stats(&state.index).await.map_err(|e| {
        error!("Stats request failed: {}", e);
        backend_failure(format!("Failed to get stats: {}", e))
    })?;

    // The index's updatedAt is the closest thing the backend exposes to a
    // last-crawl time; without it we can only report the serve time.
    let last_crawl = stats
        .updated_at
        .unwrap_or_else(Utc::now)
        .to_rfc3339();

    Ok(Json(StatsResponse {
        total_indexed: stats.documents,
        is_indexing: stats.is_indexing,
        last_crawl,
    }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| bad_request(format!("Invalid request: {}", e)))?;

    if request.query.trim().is_empty() {
        return Err(bad_request("Query cannot be empty".to_string()));
    }

    let limit = effective_limit(request.limit);

    // Only the backend round-trip counts toward search_time_ms
    let start = Instant::now();
    let (results, total) = state
        .backend
        .search(&state.index, &request.query, limit, request.offset)
        .await
        .map_err(|e| {
            error!("Search request failed: {}", e);
            backend_failure(format!("Search failed: {}", e))
        })?;
    let search_time_ms = start.elapsed().as_millis() as i64;

    Ok(Json(SearchResponse {
        query: request.query,
        total,
        results,
        search_time_ms,
    }))
}

/// Unset or zero means the default page size; anything above the cap is
/// clamped rather than rejected.
pub fn effective_limit(limit: u32) -> u32 {
    match limit {
        0 => DEFAULT_LIMIT,
        l if l > MAX_LIMIT => MAX_LIMIT,
        l => l,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_when_unset() {
        assert_eq!(effective_limit(0), 20);
    }

    #[test]
    fn limit_clamps_to_maximum() {
        assert_eq!(effective_limit(101), 100);
        assert_eq!(effective_limit(5000), 100);
    }

    #[test]
    fn limit_in_range_passes_through() {
        assert_eq!(effective_limit(1), 1);
        assert_eq!(effective_limit(20), 20);
        assert_eq!(effective_limit(100), 100);
    }
}
