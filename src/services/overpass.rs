use crate::constants::OVERPASS_QUERY_TIMEOUT_SECONDS;
use crate::error::{AppError, Result};
use crate::services::rate_limiter::RateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Sends one query to one endpoint. Retry and failover live in [`OverpassClient`].
#[async_trait]
pub trait OverpassTransport: Send + Sync {
    async fn post_query(&self, endpoint: &str, query: &str) -> Result<OverpassResponse>;
}

pub struct HttpOverpassTransport {
    client: Client,
}

impl HttpOverpassTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpOverpassTransport { client })
    }
}

#[async_trait]
impl OverpassTransport for HttpOverpassTransport {
    async fn post_query(&self, endpoint: &str, query: &str) -> Result<OverpassResponse> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(query)))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::SpatialQuery(format!("Request to {} timed out", endpoint))
                } else {
                    AppError::SpatialQuery(format!("Request to {} failed: {}", endpoint, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::SpatialQuery(format!(
                "HTTP {} from {}: {}",
                status, endpoint, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::SpatialQuery(format!("Failed to parse response: {}", e)))
    }
}

/// Position in the failover sequence: which endpoint to hit next and how many
/// full rounds over the endpoint list remain after the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub endpoint_index: usize,
    pub retries_left: usize,
}

impl Attempt {
    pub fn first(max_retries: usize) -> Self {
        Attempt {
            endpoint_index: 0,
            retries_left: max_retries.saturating_sub(1),
        }
    }

    /// Next endpoint in order; after the last one, start a new round if any remain.
    pub fn next(self, endpoint_count: usize) -> Option<Attempt> {
        if self.endpoint_index + 1 < endpoint_count {
            Some(Attempt {
                endpoint_index: self.endpoint_index + 1,
                ..self
            })
        } else if self.retries_left > 0 {
            Some(Attempt {
                endpoint_index: 0,
                retries_left: self.retries_left - 1,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Rounds over the whole endpoint list
    pub max_retries: usize,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Backoff before round `round` (1-based): base * 2^(round - 1)
    pub fn backoff(&self, round: usize) -> Duration {
        let exponent = round.saturating_sub(1).min(16) as u32;
        self.backoff_base * 2_u32.pow(exponent)
    }
}

/// Overpass client with ordered endpoint failover, exponential backoff between
/// rounds, and a shared minimum delay between queries.
#[derive(Clone)]
pub struct OverpassClient {
    transport: Arc<dyn OverpassTransport>,
    endpoints: Arc<Vec<String>>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl OverpassClient {
    pub fn new(
        transport: Arc<dyn OverpassTransport>,
        endpoints: Vec<String>,
        rate_limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(AppError::Internal(
                "Overpass client needs at least one endpoint".to_string(),
            ));
        }

        Ok(OverpassClient {
            transport,
            endpoints: Arc::new(endpoints),
            rate_limiter,
            retry,
        })
    }

    /// Run one logical query through the failover sequence.
    pub async fn execute(&self, query: &str, query_type: &str) -> Result<OverpassResponse> {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = Attempt::first(max_retries);
        let mut attempts_made = 0;

        loop {
            self.rate_limiter.acquire().await;
            attempts_made += 1;

            let endpoint = &self.endpoints[attempt.endpoint_index];
            let result = self
                .transport
                .post_query(endpoint, query)
                .await
                .and_then(OverpassResponse::into_checked);
            let error = match result {
                Ok(response) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        elements = response.elements.len(),
                        "{} returned {} elements from {}",
                        query_type, response.elements.len(), endpoint
                    );
                    return Ok(response);
                }
                Err(e) => e,
            };

            let Some(next) = attempt.next(self.endpoints.len()) else {
                return Err(AppError::SpatialQuery(format!(
                    "{} exhausted {} endpoints x {} rounds ({} attempts), last error: {}",
                    query_type,
                    self.endpoints.len(),
                    max_retries,
                    attempts_made,
                    error
                )));
            };

            if next.retries_left < attempt.retries_left {
                let round = max_retries - next.retries_left;
                let backoff = self.retry.backoff(round - 1);
                tracing::warn!(
                    "{} failed on every endpoint ({}), retrying in {}ms (round {}/{})",
                    query_type,
                    error,
                    backoff.as_millis(),
                    round,
                    max_retries
                );
                tokio::time::sleep(backoff).await;
            } else {
                tracing::warn!(
                    "{} failed on {} ({}), falling back to {}",
                    query_type,
                    endpoint,
                    error,
                    self.endpoints[next.endpoint_index]
                );
            }

            attempt = next;
        }
    }
}

/// Common preamble for every Overpass QL query
pub fn query_header() -> String {
    format!(
        "[out:json][timeout:{}][maxsize:536870912];",
        OVERPASS_QUERY_TIMEOUT_SECONDS
    )
}

// Overpass API response types

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// Set by the server when the query hit its own timeout or memory limit.
    /// The HTTP status is still 200 and `elements` may be partial.
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    /// Turn a server-side runtime error into a failed attempt.
    pub fn into_checked(self) -> Result<Self> {
        match self.remark.as_deref() {
            Some(remark) if remark.contains("runtime error") => Err(AppError::SpatialQuery(
                format!("Server-side failure: {}", remark),
            )),
            _ => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<GeometryPoint>,
    #[serde(default)]
    pub geometry: Option<Vec<GeometryPoint>>,
    #[serde(default)]
    pub nodes: Option<Vec<i64>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryPoint {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Node position, or the centroid of a way/relation.
    pub fn position(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some((lat, lon));
        }
        if let Some(centroid) = self.geometry.as_deref().and_then(calculate_centroid) {
            return Some(centroid);
        }
        self.center.map(|c| (c.lat, c.lon))
    }
}

/// Calculate centroid from geometry points (for ways/relations)
fn calculate_centroid(geometry: &[GeometryPoint]) -> Option<(f64, f64)> {
    if geometry.is_empty() {
        return None;
    }

    let count = geometry.len() as f64;
    let (lat_sum, lon_sum) = geometry
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));

    Some((lat_sum / count, lon_sum / count))
}
