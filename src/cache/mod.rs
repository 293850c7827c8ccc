mod geocode;
mod memory;

pub use geocode::GeocodeCache;
pub use memory::MapCache;

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}

impl CacheStats {
    fn from_counters(hits: u64, misses: u64, entries: u64) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries,
        }
    }
}

/// Generate a cache key for a linear map request.
/// Place names are trimmed and lowercased, segment length is bucketed to 0.1 km.
pub fn linear_map_cache_key(origin: &str, destination: &str, segment_length_km: f64) -> String {
    let mut hasher = DefaultHasher::new();

    origin.trim().to_lowercase().hash(&mut hasher);
    destination.trim().to_lowercase().hash(&mut hasher);
    ((segment_length_km * 10.0).round() as i64).hash(&mut hasher);

    format!("linear_map:{:x}", hasher.finish())
}

/// Normalised geocode cache key
pub fn geocode_cache_key(place: &str) -> String {
    place.trim().to_lowercase()
}
