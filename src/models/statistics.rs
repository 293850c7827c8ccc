use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopRecommendation {
    pub distance_km: f64,
    pub name: String,
    pub coordinates: Coordinates,
    /// Milestone types merged into this stop, e.g. `gas_station`, `restaurant`
    pub services: Vec<String>,
    pub amenities: Vec<String>,
    pub milestone_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QualityMetrics {
    pub average_quality_score: f64,
    pub with_phone_fraction: f64,
    pub with_opening_hours_fraction: f64,
    pub with_website_fraction: f64,
    pub total_analyzed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouteStatistics {
    pub total_distance_km: f64,
    pub total_milestones: usize,
    pub counts_by_type: BTreeMap<String, usize>,
    pub average_spacing_km: Option<f64>,
    pub density_per_100km: f64,
    pub stop_recommendations: Vec<StopRecommendation>,
    pub quality: QualityMetrics,
}
