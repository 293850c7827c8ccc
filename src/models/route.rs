use crate::constants::{MAX_SEGMENT_LENGTH_KM, MIN_SEGMENT_LENGTH_KM};
use crate::models::{Coordinates, Milestone, RoadSegment, RouteStatistics};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub total_distance_km: f64,
    pub total_duration_minutes: u32,
    pub geometry: Vec<Coordinates>,
    /// Distinct road names in travel order
    pub road_names: Vec<String>,
}

impl Route {
    /// Concatenate segment geometries, dropping the shared vertex between
    /// consecutive segments.
    pub fn from_segments(
        origin: Coordinates,
        destination: Coordinates,
        segments: &[RoadSegment],
    ) -> Self {
        let mut geometry: Vec<Coordinates> = Vec::new();
        let mut road_names: Vec<String> = Vec::new();
        let mut total_meters = 0.0;
        let mut total_secs = 0.0;

        for segment in segments {
            for point in &segment.geometry {
                if geometry.last() != Some(point) {
                    geometry.push(*point);
                }
            }
            if let Some(name) = segment.display_name() {
                if !road_names.iter().any(|n| n == name) {
                    road_names.push(name.to_string());
                }
            }
            total_meters += segment.length_meters;
            total_secs += segment.estimated_duration_secs();
        }

        Route {
            origin,
            destination,
            total_distance_km: total_meters / 1000.0,
            total_duration_minutes: (total_secs / 60.0).round() as u32,
            geometry,
            road_names,
        }
    }
}

/// One fixed-length slice of the distance axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSegment {
    pub id: String,
    pub start_distance_km: f64,
    pub end_distance_km: f64,
    pub length_km: f64,
    pub name: String,
    pub start_coordinates: Coordinates,
    pub end_coordinates: Coordinates,
    pub milestones: Vec<Milestone>,
}

/// Non-fatal conditions detected while building the map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverageWarning {
    /// The graph node nearest to an endpoint is far from it
    NodeOffset {
        endpoint: String,
        offset_km: f64,
        threshold_km: f64,
    },
    /// Route length / straight-line distance is implausible
    LengthRatio {
        route_km: f64,
        straight_line_km: f64,
        ratio: f64,
    },
}

impl CoverageWarning {
    pub fn log(&self) {
        match self {
            CoverageWarning::NodeOffset {
                endpoint,
                offset_km,
                threshold_km,
            } => tracing::warn!(
                endpoint = %endpoint,
                offset_km = %format!("{:.1}", offset_km),
                "Nearest road node to {} is {:.1}km away (threshold {:.0}km), graph coverage may be partial",
                endpoint, offset_km, threshold_km
            ),
            CoverageWarning::LengthRatio {
                route_km,
                straight_line_km,
                ratio,
            } => tracing::warn!(
                ratio = %format!("{:.2}", ratio),
                "Route length {:.1}km is {:.2}x the straight-line {:.1}km, indicating partial coverage or an excessive detour",
                route_km, ratio, straight_line_km
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearMapRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub segment_length_km: Option<f64>,
}

impl LinearMapRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.origin.trim().is_empty() {
            return Err("origin must not be empty".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination must not be empty".to_string());
        }
        if let Some(length) = self.segment_length_km {
            if !(MIN_SEGMENT_LENGTH_KM..=MAX_SEGMENT_LENGTH_KM).contains(&length) {
                return Err(format!(
                    "segment_length_km must be between {} and {}",
                    MIN_SEGMENT_LENGTH_KM, MAX_SEGMENT_LENGTH_KM
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearMap {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub route: Route,
    pub road_segments: Vec<RoadSegment>,
    pub segments: Vec<LinearSegment>,
    pub milestones: Vec<Milestone>,
    pub statistics: RouteStatistics,
    pub warnings: Vec<CoverageWarning>,
    /// RFC 3339 timestamp
    pub generated_at: String,
}
