pub mod health;
pub mod linear_map;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/linear-maps", post(linear_map::create_linear_map))
        .route("/health", get(health::health_check))
        .with_state(state)
}
