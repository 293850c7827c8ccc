use linearmap::error::AppError;
use linearmap::models::{CoverageWarning, LinearMapRequest, MilestoneType, RoadSide};
use linearmap::services::road_graph::RoadGraph;
use std::sync::Arc;

mod common;

use common::{Answer, FakeGeocoder, FakePoiSource, FakeRoadSource};

fn request(segment_length_km: Option<f64>) -> LinearMapRequest {
    LinearMapRequest {
        origin: common::ORIGIN.to_string(),
        destination: common::DESTINATION.to_string(),
        segment_length_km,
    }
}

#[tokio::test]
async fn test_generates_linear_map_end_to_end() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let pois = Arc::new(FakePoiSource::new(common::route_pois()));
    let service = common::build_service(geocoder, roads.clone(), pois);

    let map = service.generate(&request(None)).await.unwrap();

    // Intercity: the bounding box fetch succeeded first
    assert_eq!(roads.calls(), vec!["bbox"]);
    assert!(map.warnings.is_empty());

    assert_eq!(map.road_segments.len(), 10);
    assert!((map.route.total_distance_km - 111.19).abs() < 0.05);
    assert_eq!(map.route.road_names, vec!["BR-101".to_string()]);
    assert_eq!(map.route.total_duration_minutes, 67);

    // 10 km segments, contiguous over the whole route
    assert_eq!(map.segments.len(), 12);
    assert_eq!(map.segments[0].start_distance_km, 0.0);
    assert_eq!(
        map.segments.last().unwrap().end_distance_km,
        map.route.total_distance_km
    );
    for pair in map.segments.windows(2) {
        assert_eq!(pair[0].end_distance_km, pair[1].start_distance_km);
    }

    let names: Vec<&str> = map.milestones.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Posto Graal", "Cantina", "Praça de Pedágio"]);

    let fuel = &map.milestones[0];
    assert_eq!(fuel.milestone_type, MilestoneType::GasStation);
    assert!(!fuel.requires_detour);
    assert!(fuel.amenities.contains(&"restroom".to_string()));
    assert_eq!(fuel.city.as_deref(), Some("Cidade Teste"));

    let cantina = &map.milestones[1];
    assert!(cantina.requires_detour);
    assert_eq!(cantina.side, RoadSide::Left);
    assert!((cantina.distance_from_road_meters - 2235.0).abs() < 20.0);
    assert!((cantina.junction_distance_km.unwrap() - 55.6).abs() < 0.1);
    assert!(cantina.quality_score >= 0.4);

    let toll = &map.milestones[2];
    assert_eq!(toll.side, RoadSide::Center);
    assert!(toll.junction_distance_km.is_none());

    for m in &map.milestones {
        assert!(m.distance_from_origin_km >= 0.0);
        assert!(m.distance_from_origin_km <= map.route.total_distance_km);
    }

    // Cantina at 55.6 km lands in segment 6 (50-60 km)
    assert_eq!(map.segments[5].milestones.len(), 1);
    assert_eq!(map.segments[5].milestones[0].name, "Cantina");

    assert_eq!(map.statistics.total_milestones, 3);
    assert_eq!(map.statistics.counts_by_type.get("gas_station"), Some(&1));
    assert!(map.statistics.stop_recommendations.is_empty());
    assert!(!map.generated_at.is_empty());
}

#[tokio::test]
async fn test_abandoned_poi_never_becomes_milestone() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let pois = Arc::new(FakePoiSource::new(common::route_pois()));
    let service = common::build_service(geocoder, roads, pois);

    let map = service.generate(&request(Some(25.0))).await.unwrap();

    assert!(map.milestones.iter().all(|m| m.id != "node/3"));
    assert!(map
        .segments
        .iter()
        .flat_map(|s| s.milestones.iter())
        .all(|m| m.name != "Posto Velho"));
    assert_eq!(map.segments.len(), 5);
}

#[tokio::test]
async fn test_falls_back_to_midpoint_radius() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let mut source = FakeRoadSource::new(common::highway_graph());
    source.bbox = Answer::Fail;
    let roads = Arc::new(source);
    let service = common::build_service(geocoder, roads.clone(), Arc::new(FakePoiSource::new(vec![])));

    let map = service.generate(&request(None)).await.unwrap();

    assert_eq!(roads.calls(), vec!["bbox", "point"]);
    assert!(map.milestones.is_empty());
}

#[tokio::test]
async fn test_no_road_network_after_every_strategy() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let mut source = FakeRoadSource::new(RoadGraph::new());
    source.bbox = Answer::Fail;
    source.place = Answer::Empty;
    source.point = Answer::Empty;
    let roads = Arc::new(source);
    let service = common::build_service(geocoder, roads.clone(), Arc::new(FakePoiSource::new(vec![])));

    let err = service.generate(&request(None)).await.unwrap_err();

    assert!(matches!(err, AppError::NoRoadNetwork(_)));
    // bbox, midpoint, origin x2, destination, coordinate radius
    assert_eq!(
        roads.calls(),
        vec!["bbox", "point", "place", "place", "place", "point"]
    );
}

#[tokio::test]
async fn test_unknown_place_is_geocode_error() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let service = common::build_service(geocoder, roads.clone(), Arc::new(FakePoiSource::new(vec![])));

    let mut req = request(None);
    req.destination = "Atlantis".to_string();
    let err = service.generate(&req).await.unwrap_err();

    assert!(matches!(err, AppError::Geocode(_)));
    assert!(roads.calls().is_empty());
}

#[tokio::test]
async fn test_poi_failure_is_partial_coverage_not_error() {
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let service = common::build_service(geocoder, roads, Arc::new(FakePoiSource::failing()));

    let map = service.generate(&request(None)).await.unwrap();

    assert!(map.milestones.is_empty());
    assert_eq!(map.statistics.total_milestones, 0);
    assert!(!map.segments.is_empty());
}

#[tokio::test]
async fn test_far_endpoint_produces_coverage_warning() {
    // Destination geocodes ~60 km beyond the end of the road network
    let geocoder = Arc::new(FakeGeocoder::new(&[
        (common::ORIGIN, common::coord(0.0, 0.0)),
        (common::DESTINATION, common::coord(0.0, 1.55)),
    ]));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let service = common::build_service(geocoder, roads, Arc::new(FakePoiSource::new(vec![])));

    let map = service.generate(&request(None)).await.unwrap();

    assert!(map.warnings.iter().any(|w| matches!(
        w,
        CoverageWarning::NodeOffset { endpoint, .. } if endpoint == "destination"
    )));
}

#[tokio::test]
async fn test_roadside_poi_between_intersections_uses_straight_line() {
    // ~445 m north of the trunk road, halfway between nodes 4 and 5
    let posto = common::poi(
        "node/10",
        common::coord(0.004, 0.35),
        &[("amenity", "fuel"), ("name", "Posto Meio"), ("brand", "Ipiranga")],
    );
    let geocoder = Arc::new(FakeGeocoder::new(&common::places()));
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let service = common::build_service(geocoder, roads, Arc::new(FakePoiSource::new(vec![posto])));

    let map = service.generate(&request(None)).await.unwrap();

    assert_eq!(map.milestones.len(), 1);
    let m = &map.milestones[0];
    assert!((m.distance_from_road_meters - 445.0).abs() < 5.0);
    assert!((m.distance_from_origin_km - 38.92).abs() < 0.05);
    assert!(m.junction_distance_km.is_none());
    assert!(!m.requires_detour);
    assert_eq!(m.side, RoadSide::Left);
}

#[tokio::test]
async fn test_failed_reverse_geocoding_leaves_city_empty() {
    let mut geocoder = FakeGeocoder::new(&common::places());
    geocoder.reverse_city = None;
    let geocoder = Arc::new(geocoder);
    let roads = Arc::new(FakeRoadSource::new(common::highway_graph()));
    let pois = Arc::new(FakePoiSource::new(common::route_pois()));
    let service = common::build_service(geocoder.clone(), roads, pois);

    let map = service.generate(&request(None)).await.unwrap();

    assert_eq!(map.milestones.len(), 3);
    assert!(map.milestones.iter().all(|m| m.city.is_none()));
    // Only the two endpoint lookups; reverse geocoding is not counted
    assert_eq!(geocoder.calls(), 2);
}
