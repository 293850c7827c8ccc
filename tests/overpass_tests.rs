use async_trait::async_trait;
use linearmap::cache::GeocodeCache;
use linearmap::config::LinearMapConfig;
use linearmap::constants::{DEFAULT_NOMINATIM_URL, DEFAULT_OVERPASS_ENDPOINTS, DEFAULT_USER_AGENT};
use linearmap::error::{AppError, Result};
use linearmap::models::{Coordinates, HighwayFilter, PoiCategory};
use linearmap::services::geocoding::{Geocoder, NominatimGeocoder};
use linearmap::services::geometry::BoundingBox;
use linearmap::services::overpass::{
    HttpOverpassTransport, OverpassClient, OverpassResponse, OverpassTransport, RetryPolicy,
};
use linearmap::services::poi_query::{PoiQueryEngine, PoiSource};
use linearmap::services::rate_limiter::RateLimiter;
use linearmap::services::road_network::{OverpassRoadSource, RoadNetworkSource};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;

/// Serves one canned body; the first endpoint always fails.
struct CannedTransport {
    body: &'static str,
    queries: Mutex<Vec<(String, String)>>,
}

impl CannedTransport {
    fn new(body: &'static str) -> Self {
        CannedTransport {
            body,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl OverpassTransport for CannedTransport {
    async fn post_query(&self, endpoint: &str, query: &str) -> Result<OverpassResponse> {
        self.queries
            .lock()
            .unwrap()
            .push((endpoint.to_string(), query.to_string()));
        if endpoint == "primary" {
            return Err(AppError::SpatialQuery("HTTP 504".to_string()));
        }
        serde_json::from_str(self.body)
            .map_err(|e| AppError::SpatialQuery(format!("bad body: {}", e)))
    }
}

fn client(transport: Arc<CannedTransport>) -> OverpassClient {
    OverpassClient::new(
        transport,
        vec!["primary".to_string(), "secondary".to_string()],
        Arc::new(RateLimiter::new(Duration::ZERO)),
        RetryPolicy {
            max_retries: 1,
            backoff_base: Duration::from_millis(1),
        },
    )
    .unwrap()
}

/// way 10: 1 - 2 - 3, way 20: 3 - 4, way 30: 5 - 6 far east
const ROADS: &str = r#"{"elements":[
    {"type":"way","id":10,"nodes":[1,2,3],"tags":{"highway":"trunk","ref":"BR-116"}},
    {"type":"way","id":20,"nodes":[3,4],"tags":{"highway":"primary"}},
    {"type":"way","id":30,"nodes":[5,6],"tags":{"highway":"primary"}},
    {"type":"node","id":1,"lat":0.0,"lon":0.0},
    {"type":"node","id":2,"lat":0.0,"lon":0.1},
    {"type":"node","id":3,"lat":0.0,"lon":0.2},
    {"type":"node","id":4,"lat":0.0,"lon":0.3},
    {"type":"node","id":5,"lat":0.0,"lon":2.0},
    {"type":"node","id":6,"lat":0.0,"lon":2.1}
]}"#;

const POIS: &str = r#"{"elements":[
    {"type":"node","id":1,"lat":0.001,"lon":0.3,"tags":{"amenity":"fuel","name":"Posto Graal"}},
    {"type":"way","id":7,"center":{"lat":0.002,"lon":0.5},"tags":{"amenity":"restaurant","name":"Cantina"}},
    {"type":"node","id":8,"lat":0.0,"lon":0.6,"tags":{"highway":"crossing"}}
]}"#;

#[tokio::test]
async fn test_bbox_fetch_drops_edges_outside_the_box() {
    let transport = Arc::new(CannedTransport::new(ROADS));
    let source = OverpassRoadSource::new(client(transport.clone()));

    let bbox = BoundingBox {
        south: -0.05,
        west: -0.05,
        north: 0.05,
        east: 0.15,
    };
    let graph = source
        .fetch_bbox(&bbox, &HighwayFilter::MajorOnly)
        .await
        .unwrap();

    // Only the 1 <-> 3 edge pair has an end inside the box
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.node_index(1).is_some());
    assert!(graph.node_index(4).is_none());

    let queries = transport.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, "primary");
    assert_eq!(queries[1].0, "secondary");
    assert!(queries[1].1.contains("(-0.05,-0.05,0.05,0.15)"));
}

#[tokio::test]
async fn test_place_fetch_uses_area_name() {
    let transport = Arc::new(CannedTransport::new(ROADS));
    let source = OverpassRoadSource::new(client(transport.clone()));

    let graph = source
        .fetch_place("Resende, RJ", &HighwayFilter::Drivable)
        .await
        .unwrap();

    // 1-3, 3-4 and 5-6, each in both directions
    assert_eq!(graph.edge_count(), 6);
    let query = &transport.queries()[1].1;
    assert!(query.contains(r#"area["name"="Resende"]"#));
}

#[tokio::test]
async fn test_poi_engine_merges_batches() {
    let transport = Arc::new(CannedTransport::new(POIS));
    let config = LinearMapConfig {
        batch_size: 2,
        max_concurrent_batches: 2,
        ..LinearMapConfig::default()
    };
    let engine = PoiQueryEngine::new(client(transport.clone()), &config);

    let points: Vec<Coordinates> = (0..4).map(|i| common::coord(0.0, i as f64 * 0.2)).collect();
    let mut pois = engine.find_pois_near(&points, 3000.0).await.unwrap();
    pois.sort_by(|a, b| a.id.cmp(&b.id));

    // Both batches return the same elements; the crossing has no category
    assert_eq!(pois.len(), 2);
    assert_eq!(pois[0].id, "node/1");
    assert_eq!(pois[0].category, PoiCategory::Fuel);
    assert_eq!(pois[1].id, "way/7");
    assert_eq!(pois[1].name, "Cantina");

    // Two batches, each failing over from primary to secondary
    let queries = transport.queries();
    assert_eq!(queries.len(), 4);
    assert!(queries
        .iter()
        .all(|(_, q)| q.contains("around:3000") && q.ends_with("out center tags;")));
}

#[tokio::test]
#[serial]
async fn test_real_overpass_radius_query() {
    if !common::should_run_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let transport = Arc::new(
        HttpOverpassTransport::new(
            Duration::from_secs(10),
            Duration::from_secs(90),
            DEFAULT_USER_AGENT,
        )
        .unwrap(),
    );
    let client = OverpassClient::new(
        transport,
        DEFAULT_OVERPASS_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        Arc::new(RateLimiter::new(Duration::from_secs(1))),
        RetryPolicy {
            max_retries: 2,
            backoff_base: Duration::from_secs(2),
        },
    )
    .unwrap();
    let source = OverpassRoadSource::new(client);

    // Via Dutra near Resende
    let center = common::coord(-22.4689, -44.4469);
    let graph = source
        .fetch_point(&center, 2000.0, &HighwayFilter::MajorOnly)
        .await
        .unwrap();

    assert!(graph.node_count() > 0, "expected major roads near Resende");
}

#[tokio::test]
#[serial]
async fn test_real_nominatim_geocode() {
    if !common::should_run_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let geocoder = NominatimGeocoder::new(
        DEFAULT_NOMINATIM_URL.to_string(),
        DEFAULT_USER_AGENT,
        Duration::from_secs(20),
        Arc::new(GeocodeCache::new(10)),
    )
    .unwrap();

    let coords = geocoder.geocode("São Paulo, SP").await.unwrap();
    assert!((coords.lat - -23.55).abs() < 0.5);
    assert!((coords.lng - -46.63).abs() < 0.5);
}
