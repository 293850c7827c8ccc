use crate::cache::CacheStats;
use crate::models::LinearMap;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache of generated linear maps, backed by moka with TTL and
/// bounded capacity. All methods are `&self`.
pub struct MapCache {
    maps: Cache<String, Arc<LinearMap>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MapCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let maps = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MapCache {
            maps,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &str) -> Option<LinearMap> {
        match self.maps.get(key).await {
            Some(map) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Map cache hit: {}", key);
                Some((*map).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Map cache miss: {}", key);
                None
            }
        }
    }

    pub async fn insert(&self, key: &str, map: &LinearMap) {
        self.maps.insert(key.to_string(), Arc::new(map.clone())).await;
        tracing::debug!(
            "Cached linear map {} ({} segments): {}",
            map.id,
            map.segments.len(),
            key
        );
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counters(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.maps.entry_count(),
        )
    }
}
