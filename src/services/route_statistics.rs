use crate::constants::{MAX_STOP_RECOMMENDATIONS, MIN_STOP_SPACING_KM, STOP_MERGE_RADIUS_KM};
use crate::models::{Milestone, MilestoneType, QualityMetrics, RouteStatistics, StopRecommendation};
use std::collections::{BTreeMap, BTreeSet};

pub fn compute_statistics(milestones: &[Milestone], total_distance_km: f64) -> RouteStatistics {
    let mut counts_by_type: BTreeMap<String, usize> = BTreeMap::new();
    for milestone in milestones {
        *counts_by_type
            .entry(milestone.milestone_type.to_string())
            .or_insert(0) += 1;
    }

    let density_per_100km = if total_distance_km > 0.0 {
        milestones.len() as f64 / total_distance_km * 100.0
    } else {
        0.0
    };

    RouteStatistics {
        total_distance_km,
        total_milestones: milestones.len(),
        counts_by_type,
        average_spacing_km: average_spacing(milestones),
        density_per_100km,
        stop_recommendations: recommend_stops(milestones),
        quality: quality_metrics(milestones),
    }
}

fn sorted_by_distance<'a>(milestones: impl Iterator<Item = &'a Milestone>) -> Vec<&'a Milestone> {
    let mut sorted: Vec<&Milestone> = milestones.collect();
    sorted.sort_by(|a, b| {
        a.distance_from_origin_km
            .total_cmp(&b.distance_from_origin_km)
    });
    sorted
}

/// Mean gap between consecutive milestones; `None` with fewer than two.
pub fn average_spacing(milestones: &[Milestone]) -> Option<f64> {
    let sorted = sorted_by_distance(milestones.iter());
    if sorted.len() < 2 {
        return None;
    }
    let span = sorted[sorted.len() - 1].distance_from_origin_km - sorted[0].distance_from_origin_km;
    Some(span / (sorted.len() - 1) as f64)
}

fn is_stop_candidate(milestone: &Milestone) -> bool {
    matches!(
        milestone.milestone_type,
        MilestoneType::GasStation | MilestoneType::Restaurant
    )
}

/// Up to five fuel/food stops at least 150 km apart. Candidates within 5 km
/// of a chosen stop are merged into it.
pub fn recommend_stops(milestones: &[Milestone]) -> Vec<StopRecommendation> {
    let candidates = sorted_by_distance(milestones.iter().filter(|m| is_stop_candidate(m)));
    let mut stops = Vec::new();
    let mut last_stop_km = 0.0;

    for anchor in &candidates {
        if stops.len() >= MAX_STOP_RECOMMENDATIONS {
            break;
        }
        if anchor.distance_from_origin_km - last_stop_km < MIN_STOP_SPACING_KM {
            continue;
        }

        let nearby: Vec<&Milestone> = candidates
            .iter()
            .copied()
            .filter(|m| {
                (m.distance_from_origin_km - anchor.distance_from_origin_km).abs()
                    <= STOP_MERGE_RADIUS_KM
            })
            .collect();

        let services: BTreeSet<String> = nearby
            .iter()
            .map(|m| m.milestone_type.to_string())
            .collect();
        let amenities: BTreeSet<String> = nearby
            .iter()
            .flat_map(|m| m.amenities.iter().cloned())
            .collect();

        stops.push(StopRecommendation {
            distance_km: anchor.distance_from_origin_km,
            name: anchor.name.clone(),
            coordinates: anchor.coordinates,
            services: services.into_iter().collect(),
            amenities: amenities.into_iter().collect(),
            milestone_ids: nearby.iter().map(|m| m.id.clone()).collect(),
        });
        last_stop_km = anchor.distance_from_origin_km;
    }

    stops
}

pub fn quality_metrics(milestones: &[Milestone]) -> QualityMetrics {
    if milestones.is_empty() {
        return QualityMetrics::default();
    }
    let n = milestones.len() as f64;
    let fraction = |pred: fn(&Milestone) -> bool| {
        milestones.iter().filter(|m| pred(m)).count() as f64 / n
    };

    QualityMetrics {
        average_quality_score: milestones.iter().map(|m| m.quality_score).sum::<f64>() / n,
        with_phone_fraction: fraction(|m| m.phone.is_some()),
        with_opening_hours_fraction: fraction(|m| m.opening_hours.is_some()),
        with_website_fraction: fraction(|m| m.website.is_some()),
        total_analyzed: milestones.len(),
    }
}
