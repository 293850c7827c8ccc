use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /health - Liveness plus map cache counters
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    match state.cache {
        Some(ref cache) => {
            status["checks"]["map_cache"] = json!(cache.stats());
        }
        None => {
            status["checks"]["map_cache"] = json!("disabled");
        }
    }

    if let Some(ref cache) = state.geocode_cache {
        status["checks"]["geocode_cache"] = json!(cache.stats());
    }

    let config = state.linear_map_service.config();
    status["checks"]["pipeline"] = json!({
        "segment_length_km": config.segment_length_km,
        "poi_search_radius_m": config.poi_search_radius_m,
        "max_concurrent_batches": config.max_concurrent_batches,
    });

    Json(status)
}
