use crate::constants::{DETOUR_STRAIGHT_LINE_THRESHOLD_M, MIN_ACCESS_ROUTE_KM};
use crate::models::{
    Coordinates, JunctionInfo, LinearSegment, Milestone, MilestoneType, Poi, PoiCategory,
    RoadSide,
};
use crate::services::geocoding::Geocoder;
use crate::services::geometry::{direction_at, path_length_km, side_of, Vec2};
use crate::services::poi_quality::extract_amenities;

/// Where a POI projects onto the route.
#[derive(Debug, Clone, Copy)]
pub struct RoutePlacement {
    pub distance_from_origin_km: f64,
    pub straight_line_m: f64,
    pub nearest_point: Coordinates,
    pub segment_index: usize,
}

/// Project `point` onto the route geometry, scaling the along-route distance
/// to `total_distance_km` so it lies on the linear map's axis.
pub fn place_on_route(
    point: &Coordinates,
    geometry: &[Coordinates],
    total_distance_km: f64,
) -> Option<RoutePlacement> {
    let projection = point.project_onto_path(geometry)?;
    let geometry_km = path_length_km(geometry);
    let along = if geometry_km > 0.0 {
        projection.distance_along_km * total_distance_km / geometry_km
    } else {
        0.0
    };

    Some(RoutePlacement {
        distance_from_origin_km: along.clamp(0.0, total_distance_km.max(0.0)),
        straight_line_m: projection.distance_km * 1000.0,
        nearest_point: projection.point,
        segment_index: projection.segment_index,
    })
}

/// City from the POI's own tags.
pub fn city_from_tags(poi: &Poi) -> Option<String> {
    let keys: &[&str] = match poi.category {
        PoiCategory::City | PoiCategory::Town => return Some(poi.name.clone()),
        PoiCategory::Village => &["addr:city", "is_in:city", "is_in", "addr:municipality"],
        _ => &["addr:city", "addr:town", "addr:village", "addr:municipality"],
    };

    keys.iter().find_map(|key| {
        let value = poi.tag(key)?;
        // is_in is often a list: "Resende, RJ, Brazil"
        let first = value.split(|ch: char| ch == ',' || ch == ';').next()?.trim();
        (!first.is_empty()).then(|| first.to_string())
    })
}

/// Build a milestone from an accepted POI.
///
/// A junction whose access route is shorter than 100 m is discarded and the
/// straight-line distance to the route is used instead.
pub fn create_milestone(
    poi: &Poi,
    geometry: &[Coordinates],
    total_distance_km: f64,
    junction: Option<JunctionInfo>,
    quality_score: f64,
) -> Option<Milestone> {
    let placement = place_on_route(&poi.location, geometry, total_distance_km)?;
    let milestone_type = MilestoneType::resolve(poi.category, poi.tag("place"));

    let junction = junction.filter(|j| {
        let keep = j.access_route_distance_km >= MIN_ACCESS_ROUTE_KM;
        if !keep {
            tracing::debug!(
                "Discarding junction for '{}': access route {:.3}km",
                poi.name,
                j.access_route_distance_km
            );
        }
        keep
    });

    let (distance_from_road_meters, side, requires_detour) = match &junction {
        Some(j) => (
            j.access_route_distance_km * 1000.0,
            j.side,
            placement.straight_line_m > DETOUR_STRAIGHT_LINE_THRESHOLD_M,
        ),
        None => {
            let offset = Vec2::between(&placement.nearest_point, &poi.location);
            let side = direction_at(geometry, placement.segment_index)
                .map(|road| side_of(&road, &offset))
                .unwrap_or(RoadSide::Center);
            (placement.straight_line_m, side, false)
        }
    };

    let side = if milestone_type == MilestoneType::TollBooth {
        RoadSide::Center
    } else {
        side
    };

    let owned = |key: &str| poi.tag(key).map(str::to_string);

    Some(Milestone {
        id: poi.id.clone(),
        name: poi.name.clone(),
        milestone_type,
        category: poi.category,
        coordinates: poi.location,
        distance_from_origin_km: placement.distance_from_origin_km,
        distance_from_road_meters,
        side,
        quality_score,
        junction_distance_km: junction.map(|j| j.junction_distance_km),
        junction_coordinates: junction.map(|j| j.junction_coordinates),
        requires_detour,
        city: city_from_tags(poi),
        amenities: extract_amenities(&poi.tags),
        brand: owned("brand"),
        operator: owned("operator"),
        phone: owned("phone").or_else(|| owned("contact:phone")),
        opening_hours: owned("opening_hours"),
        website: owned("website").or_else(|| owned("contact:website")),
    })
}

/// Reverse-geocode milestones still missing a city, one call each.
/// Failures leave the city empty.
pub async fn enrich_missing_cities(milestones: &mut [Milestone], geocoder: &dyn Geocoder) {
    let mut resolved = 0usize;
    let mut attempted = 0usize;

    for milestone in milestones.iter_mut().filter(|m| m.city.is_none()) {
        attempted += 1;
        match geocoder
            .reverse_geocode(&milestone.coordinates, Some(milestone.name.as_str()))
            .await
        {
            Ok(result) => {
                if result.city.is_some() {
                    resolved += 1;
                }
                milestone.city = result.city;
            }
            Err(e) => {
                tracing::debug!("Reverse geocode for '{}' failed: {}", milestone.name, e);
            }
        }
    }

    if attempted > 0 {
        tracing::info!(
            "Reverse geocoding resolved {}/{} missing cities",
            resolved,
            attempted
        );
    }
}

/// Place each milestone into every segment whose `[start, end]` contains its
/// distance. Both ends are inclusive, so a milestone exactly on a boundary
/// lands in both neighbouring segments.
pub fn assign_to_segments(segments: &mut [LinearSegment], milestones: &[Milestone]) {
    for segment in segments.iter_mut() {
        let mut inside: Vec<Milestone> = milestones
            .iter()
            .filter(|m| {
                m.distance_from_origin_km >= segment.start_distance_km
                    && m.distance_from_origin_km <= segment.end_distance_km
            })
            .cloned()
            .collect();
        inside.sort_by(|a, b| {
            a.distance_from_origin_km
                .total_cmp(&b.distance_from_origin_km)
        });
        segment.milestones = inside;
    }
}
