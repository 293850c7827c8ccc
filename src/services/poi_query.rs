//! POI discovery along a route: sample points are batched into combined
//! Overpass queries that run concurrently on a bounded pool.

use crate::config::LinearMapConfig;
use crate::error::Result;
use crate::models::poi::POI_QUERY_TAGS;
use crate::models::{Coordinates, Poi};
use crate::services::geometry::{cumulative_distances_km, interpolate_along};
use crate::services::overpass::{query_header, OverpassClient, OverpassResponse};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use tracing::instrument;

#[async_trait]
pub trait PoiSource: Send + Sync {
    /// POIs within `radius_m` of any of `points`, deduplicated by id.
    async fn find_pois_near(&self, points: &[Coordinates], radius_m: f64) -> Result<Vec<Poi>>;
}

/// One point every `interval_km` along the path, first and last always included.
pub fn sample_route_points(geometry: &[Coordinates], interval_km: f64) -> Vec<Coordinates> {
    let (Some(first), Some(last)) = (geometry.first(), geometry.last()) else {
        return Vec::new();
    };
    if geometry.len() == 1 {
        return vec![*first];
    }

    let cumulative = cumulative_distances_km(geometry);
    let total = cumulative.last().copied().unwrap_or(0.0);

    let mut points = vec![*first];
    if interval_km > 0.0 {
        let mut distance = interval_km;
        while distance < total {
            if let Some(point) = interpolate_along(geometry, &cumulative, distance) {
                points.push(point);
            }
            distance += interval_km;
        }
    }
    if total > 0.0 || points.last() != Some(last) {
        points.push(*last);
    }
    points
}

/// Combined tag-predicate query over node/way/relation around every point.
/// Way and relation hits come back as their center.
pub fn build_batch_query(points: &[Coordinates], radius_m: f64) -> String {
    let mut query = query_header();
    query.push('(');
    for point in points {
        for (key, values) in POI_QUERY_TAGS {
            query.push_str(&format!(
                r#"nwr["{}"~"^({})$"](around:{:.0},{},{});"#,
                key,
                values.join("|"),
                radius_m,
                point.lat,
                point.lng
            ));
        }
    }
    query.push_str(");out center tags;");
    query
}

/// Convert raw elements into POIs; untagged or uncategorised elements are skipped.
pub fn parse_pois(response: &OverpassResponse) -> Vec<Poi> {
    response
        .elements
        .iter()
        .filter_map(|element| {
            let (lat, lon) = element.position()?;
            let location = Coordinates::new(lat, lon).ok()?;
            Poi::from_tags(
                format!("{}/{}", element.element_type, element.id),
                location,
                element.tags.clone(),
            )
        })
        .collect()
}

pub struct PoiQueryEngine {
    client: OverpassClient,
    batch_size: usize,
    max_concurrent_batches: usize,
}

impl PoiQueryEngine {
    pub fn new(client: OverpassClient, config: &LinearMapConfig) -> Self {
        PoiQueryEngine {
            client,
            batch_size: config.batch_size.max(1),
            max_concurrent_batches: config.max_concurrent_batches.max(1),
        }
    }
}

#[async_trait]
impl PoiSource for PoiQueryEngine {
    #[instrument(skip(self, points), fields(points = points.len()))]
    async fn find_pois_near(&self, points: &[Coordinates], radius_m: f64) -> Result<Vec<Poi>> {
        let batches: Vec<Vec<Coordinates>> = points
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        let batch_count = batches.len();

        tracing::info!(
            "Querying POIs around {} sample points in {} batches (concurrency {})",
            points.len(),
            batch_count,
            self.max_concurrent_batches
        );

        let results: Vec<(usize, Result<Vec<Poi>>)> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| {
                let client = self.client.clone();
                async move {
                    let query = build_batch_query(&batch, radius_m);
                    let label = format!("POI batch {}/{}", index + 1, batch_count);
                    let result = client
                        .execute(&query, &label)
                        .await
                        .map(|response| parse_pois(&response));
                    (index, result)
                }
            })
            .buffer_unordered(self.max_concurrent_batches)
            .collect()
            .await;

        let mut by_id: BTreeMap<String, Poi> = BTreeMap::new();
        let mut failed = 0usize;

        for (index, result) in results {
            match result {
                Ok(pois) => {
                    for poi in pois {
                        by_id.entry(poi.id.clone()).or_insert(poi);
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("POI batch {} contributed no POIs: {}", index + 1, e);
                }
            }
        }

        if batch_count > 0 && failed == batch_count {
            tracing::warn!("Every POI batch failed, continuing without POIs");
        }

        tracing::info!(
            unique = by_id.len(),
            failed_batches = failed,
            "Found {} unique POIs ({}/{} batches failed)",
            by_id.len(), failed, batch_count
        );

        Ok(by_id.into_values().collect())
    }
}
