use crate::cache::GeocodeCache;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::rate_limiter::RateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Nominatim's usage policy allows one request per second.
const NOMINATIM_MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseGeocode {
    pub city: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to a coordinate. Fails with [`AppError::Geocode`].
    async fn geocode(&self, place: &str) -> Result<Coordinates>;

    async fn reverse_geocode(
        &self,
        location: &Coordinates,
        poi_name: Option<&str>,
    ) -> Result<ReverseGeocode>;
}

/// "Resende, RJ, Brazil" -> "Resende, RJ"
pub fn strip_country_suffix(place: &str) -> Option<String> {
    let (head, _) = place.rsplit_once(',')?;
    let head = head.trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// Look `place` up, then once more without its country suffix when the first
/// lookup found nothing or failed.
async fn resolve_with_fallback<F, Fut>(place: &str, search: F) -> Result<Coordinates>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<Coordinates>>>,
{
    let unresolved = || AppError::Geocode(format!("Could not resolve '{}'", place));

    let first_error = match search(place.to_string()).await {
        Ok(Some(coordinates)) => return Ok(coordinates),
        Ok(None) => None,
        Err(e) => Some(e),
    };

    let Some(shorter) = strip_country_suffix(place) else {
        return Err(first_error.unwrap_or_else(unresolved));
    };

    match first_error {
        Some(e) => tracing::warn!("Geocoding '{}' failed ({}), retrying as '{}'", place, e, shorter),
        None => tracing::info!("No geocode result for '{}', retrying as '{}'", place, shorter),
    }

    search(shorter).await?.ok_or_else(unresolved)
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    cache: Arc<GeocodeCache>,
    rate_limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration, cache: Arc<GeocodeCache>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(NominatimGeocoder {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            rate_limiter: RateLimiter::new(NOMINATIM_MIN_INTERVAL),
        })
    }

    async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::Geocode(format!("Request for '{}' failed: {}", query, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Geocode(format!(
                "HTTP {} while geocoding '{}'",
                response.status(),
                query
            )));
        }

        let results: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| AppError::Geocode(format!("Failed to parse response: {}", e)))?;

        Ok(results.first().and_then(|place| {
            let lat = place.lat.parse().ok()?;
            let lng = place.lon.parse().ok()?;
            Coordinates::new(lat, lng).ok()
        }))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Coordinates> {
        if let Some(cached) = self.cache.get(place).await {
            tracing::debug!("Geocode cache hit for '{}'", place);
            return Ok(cached);
        }

        let coordinates =
            resolve_with_fallback(place, move |query| async move { self.search(&query).await })
                .await?;

        tracing::info!(
            "Geocoded '{}' to ({:.4}, {:.4})",
            place,
            coordinates.lat,
            coordinates.lng
        );
        self.cache.insert(place, coordinates).await;
        Ok(coordinates)
    }

    async fn reverse_geocode(
        &self,
        location: &Coordinates,
        poi_name: Option<&str>,
    ) -> Result<ReverseGeocode> {
        self.rate_limiter.acquire().await;

        let lat = location.lat.to_string();
        let lon = location.lng.to_string();
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("zoom", "10"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Geocode(format!("Reverse geocode failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Geocode(format!(
                "HTTP {} while reverse geocoding {}",
                response.status(),
                poi_name.unwrap_or("location")
            )));
        }

        let body: NominatimReverse = response
            .json()
            .await
            .map_err(|e| AppError::Geocode(format!("Failed to parse response: {}", e)))?;

        let city = ["city", "town", "village", "municipality"]
            .iter()
            .find_map(|key| body.address.get(*key).cloned());

        Ok(ReverseGeocode { city })
    }
}

// Nominatim response types

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    address: HashMap<String, String>,
}
