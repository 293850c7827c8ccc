use crate::cache::{geocode_cache_key, CacheStats};
use crate::models::Coordinates;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};

/// Place name to coordinate cache owned by one geocoder.
/// Entries never expire; capacity is bounded.
pub struct GeocodeCache {
    entries: Cache<String, Coordinates>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeocodeCache {
    pub fn new(max_capacity: u64) -> Self {
        GeocodeCache {
            entries: Cache::builder().max_capacity(max_capacity).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, place: &str) -> Option<Coordinates> {
        let found = self.entries.get(&geocode_cache_key(place)).await;
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub async fn insert(&self, place: &str, coordinates: Coordinates) {
        self.entries
            .insert(geocode_cache_key(place), coordinates)
            .await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counters(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.entries.entry_count(),
        )
    }
}
