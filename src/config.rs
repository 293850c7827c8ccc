use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Primary endpoint first, fallbacks after it
    pub overpass_endpoints: Vec<String>,
    pub nominatim_url: String,
    pub user_agent: String,
    pub map_cache_ttl: u64,
    pub linear_map: LinearMapConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearMapConfig {
    /// Length of each linear segment on the distance axis
    pub segment_length_km: f64,

    /// Radius around each sample point used for POI discovery
    pub poi_search_radius_m: f64,

    /// Distance between consecutive POI sample points along the route
    pub sample_interval_km: f64,

    /// Sample points combined into one spatial query
    pub batch_size: usize,

    /// Upper bound on spatial query batches in flight
    pub max_concurrent_batches: usize,

    /// Rounds over the endpoint list before a batch gives up
    pub max_retries: usize,

    /// Base for exponential backoff between rounds (base * 2^round)
    pub retry_backoff_base_ms: u64,

    /// Minimum delay between any two outgoing spatial queries
    pub min_query_interval_ms: u64,

    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,

    /// POIs further than this (straight line) from the route are dropped
    pub max_distance_from_road_m: f64,

    /// Reverse-geocode milestones that have no city after tag enrichment
    pub enrich_cities: bool,
}

impl Default for LinearMapConfig {
    fn default() -> Self {
        Self {
            segment_length_km: 10.0,
            poi_search_radius_m: 1000.0,
            sample_interval_km: 1.0,
            batch_size: 3,
            max_concurrent_batches: 5,
            max_retries: 3,
            retry_backoff_base_ms: 1000,
            min_query_interval_ms: 1000,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            max_distance_from_road_m: 3000.0,
            enrich_cities: true,
        }
    }
}

impl LinearMapConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            segment_length_km: env::var("LINEAR_MAP_SEGMENT_LENGTH_KM")
                .unwrap_or_else(|_| defaults.segment_length_km.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_SEGMENT_LENGTH_KM")?,

            poi_search_radius_m: env::var("LINEAR_MAP_POI_SEARCH_RADIUS_M")
                .unwrap_or_else(|_| defaults.poi_search_radius_m.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_POI_SEARCH_RADIUS_M")?,

            sample_interval_km: env::var("LINEAR_MAP_SAMPLE_INTERVAL_KM")
                .unwrap_or_else(|_| defaults.sample_interval_km.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_SAMPLE_INTERVAL_KM")?,

            batch_size: env::var("LINEAR_MAP_BATCH_SIZE")
                .unwrap_or_else(|_| defaults.batch_size.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_BATCH_SIZE")?,

            max_concurrent_batches: env::var("LINEAR_MAP_MAX_CONCURRENT_BATCHES")
                .unwrap_or_else(|_| defaults.max_concurrent_batches.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_MAX_CONCURRENT_BATCHES")?,

            max_retries: env::var("LINEAR_MAP_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.max_retries.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_MAX_RETRIES")?,

            retry_backoff_base_ms: env::var("LINEAR_MAP_RETRY_BACKOFF_BASE_MS")
                .unwrap_or_else(|_| defaults.retry_backoff_base_ms.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_RETRY_BACKOFF_BASE_MS")?,

            min_query_interval_ms: env::var("LINEAR_MAP_MIN_QUERY_INTERVAL_MS")
                .unwrap_or_else(|_| defaults.min_query_interval_ms.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_MIN_QUERY_INTERVAL_MS")?,

            connect_timeout_secs: env::var("LINEAR_MAP_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.connect_timeout_secs.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_CONNECT_TIMEOUT_SECS")?,

            read_timeout_secs: env::var("LINEAR_MAP_READ_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.read_timeout_secs.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_READ_TIMEOUT_SECS")?,

            max_distance_from_road_m: env::var("LINEAR_MAP_MAX_DISTANCE_FROM_ROAD_M")
                .unwrap_or_else(|_| defaults.max_distance_from_road_m.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_MAX_DISTANCE_FROM_ROAD_M")?,

            enrich_cities: env::var("LINEAR_MAP_ENRICH_CITIES")
                .unwrap_or_else(|_| defaults.enrich_cities.to_string())
                .parse()
                .map_err(|_| "Invalid LINEAR_MAP_ENRICH_CITIES")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_SEGMENT_LENGTH_KM..=MAX_SEGMENT_LENGTH_KM).contains(&self.segment_length_km) {
            return Err(format!(
                "LINEAR_MAP_SEGMENT_LENGTH_KM must be between {} and {}",
                MIN_SEGMENT_LENGTH_KM, MAX_SEGMENT_LENGTH_KM
            ));
        }
        if self.sample_interval_km <= 0.0 {
            return Err("LINEAR_MAP_SAMPLE_INTERVAL_KM must be positive".to_string());
        }
        if self.batch_size == 0 || self.max_concurrent_batches == 0 {
            return Err(
                "LINEAR_MAP_BATCH_SIZE and LINEAR_MAP_MAX_CONCURRENT_BATCHES must be at least 1"
                    .to_string(),
            );
        }
        if self.max_retries == 0 {
            return Err("LINEAR_MAP_MAX_RETRIES must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let overpass_endpoints: Vec<String> = match env::var("OVERPASS_ENDPOINTS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_OVERPASS_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        if overpass_endpoints.is_empty() {
            return Err("OVERPASS_ENDPOINTS must list at least one endpoint".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            overpass_endpoints,
            nominatim_url: env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string()),
            user_agent: env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            map_cache_ttl: env::var("MAP_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_MAP_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid MAP_CACHE_TTL")?,
            linear_map: LinearMapConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
