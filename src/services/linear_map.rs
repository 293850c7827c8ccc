use crate::config::LinearMapConfig;
use crate::error::{AppError, Result};
use crate::models::{
    HighwayFilter, LinearMap, LinearMapRequest, Milestone, Poi, RoadSegment, Route,
};
use crate::services::geocoding::Geocoder;
use crate::services::junction::JunctionFinder;
use crate::services::milestone_factory::{
    assign_to_segments, create_milestone, enrich_missing_cities, place_on_route,
};
use crate::services::path_extractor::extract_shortest_path;
use crate::services::poi_quality::{is_abandoned, meets_threshold, quality_score};
use crate::services::poi_query::{sample_route_points, PoiSource};
use crate::services::road_graph::RoadGraph;
use crate::services::road_network::{GraphRequest, RoadGraphBuilder};
use crate::services::route_segmentation::process_route_into_segments;
use crate::services::route_statistics::compute_statistics;
use crate::services::segment_classifier::classify_and_trim;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

/// Counts of POIs dropped at each filtering stage
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PoiFilterStats {
    pub abandoned: usize,
    pub below_threshold: usize,
    pub too_far: usize,
    pub accepted: usize,
}

pub struct LinearMapService {
    geocoder: Arc<dyn Geocoder>,
    graph_builder: RoadGraphBuilder,
    poi_source: Arc<dyn PoiSource>,
    config: LinearMapConfig,
}

impl LinearMapService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        graph_builder: RoadGraphBuilder,
        poi_source: Arc<dyn PoiSource>,
        config: LinearMapConfig,
    ) -> Self {
        LinearMapService {
            geocoder,
            graph_builder,
            poi_source,
            config,
        }
    }

    pub fn config(&self) -> &LinearMapConfig {
        &self.config
    }

    pub fn segment_length_for(&self, request: &LinearMapRequest) -> f64 {
        request
            .segment_length_km
            .unwrap_or(self.config.segment_length_km)
    }

    /// Run the whole pipeline for one origin/destination pair.
    #[instrument(skip(self, request), fields(origin = %request.origin, destination = %request.destination))]
    pub async fn generate(&self, request: &LinearMapRequest) -> Result<LinearMap> {
        let segment_length_km = self.segment_length_for(request);

        let origin = self.geocoder.geocode(&request.origin).await?;
        let destination = self.geocoder.geocode(&request.destination).await?;

        let graph_request = GraphRequest {
            origin_name: request.origin.clone(),
            destination_name: request.destination.clone(),
            origin,
            destination,
            filter: HighwayFilter::Drivable,
        };
        let straight_line_km = graph_request.straight_line_km();
        let built = self.graph_builder.build(&graph_request).await?;

        let road_segments = extract_shortest_path(&built.graph, &origin, &destination)?;
        let classified = classify_and_trim(road_segments, built.scope, straight_line_km);
        let route = Route::from_segments(origin, destination, &classified.segments);

        tracing::info!(
            distance_km = %format!("{:.1}", route.total_distance_km),
            duration_min = route.total_duration_minutes,
            "Route: {:.1}km, {} min, {} road segments, via {}",
            route.total_distance_km,
            route.total_duration_minutes,
            classified.segments.len(),
            route.road_names.join(", ")
        );

        let mut segments = process_route_into_segments(&route, segment_length_km);

        let sample_points = sample_route_points(&route.geometry, self.config.sample_interval_km);
        let pois = match self
            .poi_source
            .find_pois_near(&sample_points, self.config.poi_search_radius_m)
            .await
        {
            Ok(pois) => pois,
            Err(e) => {
                tracing::warn!("POI discovery failed, continuing without milestones: {}", e);
                Vec::new()
            }
        };

        let (mut milestones, filter_stats) =
            self.build_milestones(&pois, &built.graph, &classified.segments, &route);

        tracing::info!(
            abandoned = filter_stats.abandoned,
            below_threshold = filter_stats.below_threshold,
            too_far = filter_stats.too_far,
            accepted = filter_stats.accepted,
            "{} of {} POIs accepted as milestones",
            filter_stats.accepted,
            pois.len()
        );

        if self.config.enrich_cities {
            enrich_missing_cities(&mut milestones, self.geocoder.as_ref()).await;
        }

        assign_to_segments(&mut segments, &milestones);
        let statistics = compute_statistics(&milestones, route.total_distance_km);

        let mut warnings = built.warnings;
        warnings.extend(classified.warning);

        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| AppError::Internal(format!("Failed to format timestamp: {}", e)))?;

        Ok(LinearMap {
            id: Uuid::new_v4(),
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            route,
            road_segments: classified.segments,
            segments,
            milestones,
            statistics,
            warnings,
            generated_at,
        })
    }

    /// Abandoned filter, quality threshold, distance cap, junction lookup and
    /// milestone creation. Output is sorted by distance from origin.
    pub fn build_milestones(
        &self,
        pois: &[Poi],
        graph: &RoadGraph,
        road_segments: &[RoadSegment],
        route: &Route,
    ) -> (Vec<Milestone>, PoiFilterStats) {
        let finder = JunctionFinder::new(graph, road_segments, route);
        let mut stats = PoiFilterStats::default();
        let mut milestones = Vec::new();

        for poi in pois {
            if is_abandoned(&poi.tags) {
                stats.abandoned += 1;
                continue;
            }

            let score = quality_score(&poi.tags);
            if !meets_threshold(&poi.tags, score) {
                stats.below_threshold += 1;
                continue;
            }

            let within_reach = place_on_route(&poi.location, &route.geometry, route.total_distance_km)
                .is_some_and(|p| p.straight_line_m <= self.config.max_distance_from_road_m);
            if !within_reach {
                stats.too_far += 1;
                continue;
            }

            let junction = finder.find(&poi.location);
            if let Some(milestone) = create_milestone(
                poi,
                &route.geometry,
                route.total_distance_km,
                junction,
                score,
            ) {
                stats.accepted += 1;
                milestones.push(milestone);
            }
        }

        milestones.sort_by(|a, b| {
            a.distance_from_origin_km
                .total_cmp(&b.distance_from_origin_km)
        });
        (milestones, stats)
    }
}
