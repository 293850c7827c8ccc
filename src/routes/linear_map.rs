use crate::cache;
use crate::error::{AppError, Result};
use crate::models::{LinearMap, LinearMapRequest};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /linear-maps
/// Build a linear map between two named places
pub async fn create_linear_map(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LinearMapRequest>,
) -> Result<Json<LinearMap>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let segment_length_km = state.linear_map_service.segment_length_for(&request);
    tracing::info!(
        origin = %request.origin,
        destination = %request.destination,
        segment_length_km,
        "Linear map request: '{}' -> '{}', {:.1}km segments",
        request.origin, request.destination, segment_length_km
    );

    let cache_key =
        cache::linear_map_cache_key(&request.origin, &request.destination, segment_length_km);

    if let Some(ref cache) = state.cache {
        if let Some(cached) = cache.get(&cache_key).await {
            tracing::info!(
                "Cache hit for linear map: {} milestones returned",
                cached.milestones.len()
            );
            return Ok(Json(cached));
        }
    }

    let map = state.linear_map_service.generate(&request).await?;

    if let Some(ref cache) = state.cache {
        cache.insert(&cache_key, &map).await;
    }

    Ok(Json(map))
}
