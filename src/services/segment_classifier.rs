use crate::constants::{ROUTE_RATIO_MAX, ROUTE_RATIO_MIN, TRIM_CONTEXT_WINDOW, TRIM_MIN_SEGMENTS};
use crate::models::road::{is_major_highway, is_urban_highway};
use crate::models::{CoverageWarning, RoadSegment};
use crate::services::road_network::RouteScope;

#[derive(Debug, Clone)]
pub struct ClassifiedRoute {
    pub segments: Vec<RoadSegment>,
    pub total_distance_km: f64,
    pub trimmed_leading: usize,
    pub trimmed_trailing: usize,
    pub warning: Option<CoverageWarning>,
}

/// Trim the urban fringe off long intercity routes and check the
/// route/straight-line ratio. Local routes pass through unchanged.
pub fn classify_and_trim(
    segments: Vec<RoadSegment>,
    scope: RouteScope,
    straight_line_km: f64,
) -> ClassifiedRoute {
    let (start, end) = if scope == RouteScope::Intercity && segments.len() > TRIM_MIN_SEGMENTS {
        retained_range(&segments)
    } else {
        (0, segments.len())
    };

    let trimmed_leading = start;
    let trimmed_trailing = segments.len() - end;
    let segments: Vec<RoadSegment> = segments
        .into_iter()
        .skip(start)
        .take(end - start)
        .collect();

    let total_distance_km = segments.iter().map(|s| s.length_meters).sum::<f64>() / 1000.0;

    if trimmed_leading + trimmed_trailing > 0 {
        tracing::info!(
            trimmed_leading,
            trimmed_trailing,
            "Trimmed {} leading and {} trailing urban segments, {:.1}km retained",
            trimmed_leading, trimmed_trailing, total_distance_km
        );
    }

    let warning = if scope == RouteScope::Intercity {
        length_ratio_warning(total_distance_km, straight_line_km)
    } else {
        None
    };
    if let Some(w) = &warning {
        w.log();
    }

    ClassifiedRoute {
        segments,
        total_distance_km,
        trimmed_leading,
        trimmed_trailing,
        warning,
    }
}

/// Half-open `[start, end)` of segments to keep. Only urban-class segments
/// outside the major-highway span plus its context window are dropped, and
/// only while walking inward from either end.
fn retained_range(segments: &[RoadSegment]) -> (usize, usize) {
    let is_major = |s: &RoadSegment| is_major_highway(&s.highway_type);
    let (Some(first_major), Some(last_major)) = (
        segments.iter().position(is_major),
        segments.iter().rposition(is_major),
    ) else {
        return (0, segments.len());
    };

    let window_start = first_major.saturating_sub(TRIM_CONTEXT_WINDOW);
    let window_end = (last_major + TRIM_CONTEXT_WINDOW + 1).min(segments.len());

    let mut start = 0;
    while start < window_start && is_urban_highway(&segments[start].highway_type) {
        start += 1;
    }

    let mut end = segments.len();
    while end > window_end && is_urban_highway(&segments[end - 1].highway_type) {
        end -= 1;
    }

    (start, end)
}

pub fn length_ratio_warning(route_km: f64, straight_line_km: f64) -> Option<CoverageWarning> {
    if straight_line_km <= 0.0 {
        return None;
    }
    let ratio = route_km / straight_line_km;
    if (ROUTE_RATIO_MIN..=ROUTE_RATIO_MAX).contains(&ratio) {
        return None;
    }
    Some(CoverageWarning::LengthRatio {
        route_km,
        straight_line_km,
        ratio,
    })
}
