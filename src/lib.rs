// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::{GeocodeCache, MapCache};
use std::sync::Arc;
use services::linear_map::LinearMapService;

// App state for sharing across the application
pub struct AppState {
    pub linear_map_service: LinearMapService,
    pub cache: Option<MapCache>,
    /// Shared with the geocoder, reported by the health check
    pub geocode_cache: Option<Arc<GeocodeCache>>,
}
