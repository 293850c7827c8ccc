use crate::constants::MAX_LINEAR_SEGMENTS;
use crate::models::{Coordinates, LinearSegment, Route};
use crate::services::geometry::{cumulative_distances_km, interpolate_along};

/// Segment ends closer than this to the route end are snapped onto it
const END_TOLERANCE_KM: f64 = 1e-9;

/// Cut the route's distance axis into `segment_length_km` pieces. The last
/// piece is clipped to the route length. Lengths that would need more than
/// [`MAX_LINEAR_SEGMENTS`] pieces are stretched to that count.
pub fn process_route_into_segments(route: &Route, segment_length_km: f64) -> Vec<LinearSegment> {
    let total = route.total_distance_km.max(0.0);
    let segment_length_km = segment_length_km.max(total / MAX_LINEAR_SEGMENTS as f64);
    let cumulative = cumulative_distances_km(&route.geometry);
    let geometry_km = cumulative.last().copied().unwrap_or(0.0);

    // Map a distance on the route axis onto the geometry
    let point_at = |distance_km: f64| -> Coordinates {
        let along = if total > 0.0 {
            distance_km * geometry_km / total
        } else {
            0.0
        };
        interpolate_along(&route.geometry, &cumulative, along).unwrap_or(route.origin)
    };

    if total <= 0.0 || segment_length_km <= 0.0 {
        return vec![linear_segment(0, 0.0, total, point_at(0.0), point_at(total))];
    }

    let mut segments = Vec::new();
    let mut start = 0.0;
    let mut index = 0;

    while start < total - END_TOLERANCE_KM {
        let mut end = (index as f64 + 1.0) * segment_length_km;
        if end > total - END_TOLERANCE_KM {
            end = total;
        }
        segments.push(linear_segment(index, start, end, point_at(start), point_at(end)));
        start = end;
        index += 1;
    }

    tracing::debug!(
        "Split {:.1}km route into {} segments of {:.1}km",
        total,
        segments.len(),
        segment_length_km
    );

    segments
}

fn linear_segment(
    index: usize,
    start: f64,
    end: f64,
    start_coordinates: Coordinates,
    end_coordinates: Coordinates,
) -> LinearSegment {
    LinearSegment {
        id: format!("segment_{}", index + 1),
        start_distance_km: start,
        end_distance_km: end,
        length_km: end - start,
        name: format!("{:.1} - {:.1} km", start, end),
        start_coordinates,
        end_coordinates,
        milestones: Vec::new(),
    }
}

/// Start of every segment plus the end of the last one, with distance from origin.
pub fn extract_search_points_from_segments(segments: &[LinearSegment]) -> Vec<(Coordinates, f64)> {
    let mut points: Vec<(Coordinates, f64)> = segments
        .iter()
        .map(|s| (s.start_coordinates, s.start_distance_km))
        .collect();
    if let Some(last) = segments.last() {
        points.push((last.end_coordinates, last.end_distance_km));
    }
    points
}
