use async_trait::async_trait;
use linearmap::config::LinearMapConfig;
use linearmap::error::{AppError, Result};
use linearmap::models::{Coordinates, HighwayFilter, Poi};
use linearmap::services::geocoding::{Geocoder, ReverseGeocode};
use linearmap::services::geometry::{path_length_km, BoundingBox};
use linearmap::services::linear_map::LinearMapService;
use linearmap::services::poi_query::PoiSource;
use linearmap::services::road_graph::{RoadEdge, RoadGraph};
use linearmap::services::road_network::{RoadGraphBuilder, RoadNetworkSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Geocoder backed by a fixed table of place names.
pub struct FakeGeocoder {
    places: HashMap<String, Coordinates>,
    geocode_calls: AtomicUsize,
    /// City answered by reverse geocoding; `None` makes every lookup fail
    pub reverse_city: Option<String>,
}

#[allow(dead_code)]
impl FakeGeocoder {
    pub fn new(places: &[(&str, Coordinates)]) -> Self {
        FakeGeocoder {
            places: places
                .iter()
                .map(|(name, c)| (name.to_string(), *c))
                .collect(),
            geocode_calls: AtomicUsize::new(0),
            reverse_city: Some("Cidade Teste".to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, place: &str) -> Result<Coordinates> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.places
            .get(place)
            .copied()
            .ok_or_else(|| AppError::Geocode(format!("Could not resolve '{}'", place)))
    }

    async fn reverse_geocode(
        &self,
        _location: &Coordinates,
        _poi_name: Option<&str>,
    ) -> Result<ReverseGeocode> {
        match &self.reverse_city {
            Some(city) => Ok(ReverseGeocode {
                city: Some(city.clone()),
            }),
            None => Err(AppError::Geocode("reverse geocoding unavailable".to_string())),
        }
    }
}

/// How a fake road source answers one kind of fetch
#[derive(Clone, Copy, PartialEq)]
#[allow(dead_code)]
pub enum Answer {
    Graph,
    Empty,
    Fail,
}

/// Road source that serves one prebuilt graph and records each fetch kind.
pub struct FakeRoadSource {
    graph: RoadGraph,
    pub bbox: Answer,
    pub place: Answer,
    pub point: Answer,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeRoadSource {
    pub fn new(graph: RoadGraph) -> Self {
        FakeRoadSource {
            graph,
            bbox: Answer::Graph,
            place: Answer::Graph,
            point: Answer::Graph,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, kind: &str, answer: Answer) -> Result<RoadGraph> {
        self.calls.lock().unwrap().push(kind.to_string());
        match answer {
            Answer::Graph => Ok(self.graph.clone()),
            Answer::Empty => Ok(RoadGraph::new()),
            Answer::Fail => Err(AppError::SpatialQuery(format!("{} fetch timed out", kind))),
        }
    }
}

#[async_trait]
impl RoadNetworkSource for FakeRoadSource {
    async fn fetch_bbox(&self, _bbox: &BoundingBox, _filter: &HighwayFilter) -> Result<RoadGraph> {
        self.answer("bbox", self.bbox)
    }

    async fn fetch_place(&self, _place: &str, _filter: &HighwayFilter) -> Result<RoadGraph> {
        self.answer("place", self.place)
    }

    async fn fetch_point(
        &self,
        _center: &Coordinates,
        _radius_m: f64,
        _filter: &HighwayFilter,
    ) -> Result<RoadGraph> {
        self.answer("point", self.point)
    }
}

pub struct FakePoiSource {
    pois: Vec<Poi>,
    fail: bool,
}

#[allow(dead_code)]
impl FakePoiSource {
    pub fn new(pois: Vec<Poi>) -> Self {
        FakePoiSource { pois, fail: false }
    }

    pub fn failing() -> Self {
        FakePoiSource {
            pois: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl PoiSource for FakePoiSource {
    async fn find_pois_near(&self, _points: &[Coordinates], _radius_m: f64) -> Result<Vec<Poi>> {
        if self.fail {
            return Err(AppError::SpatialQuery("all endpoints exhausted".to_string()));
        }
        Ok(self.pois.clone())
    }
}

pub fn coord(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
}

pub const ORIGIN: &str = "Alfa, SP";
pub const DESTINATION: &str = "Ômega, RJ";

#[allow(dead_code)]
pub fn places() -> Vec<(&'static str, Coordinates)> {
    vec![(ORIGIN, coord(0.0, 0.0)), (DESTINATION, coord(0.0, 1.0))]
}

fn two_way(graph: &mut RoadGraph, a: i64, b: i64, tags: &[(&str, &str)]) {
    let (ia, ib) = (graph.node_index(a).unwrap(), graph.node_index(b).unwrap());
    let (ca, cb) = (graph.node(ia).location, graph.node(ib).location);
    let tags: HashMap<String, String> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let length_meters = path_length_km(&[ca, cb]) * 1000.0;

    graph.add_edge(
        ia,
        ib,
        RoadEdge {
            way_id: a * 1000 + b,
            geometry: vec![ca, cb],
            length_meters,
            tags: tags.clone(),
        },
    );
    graph.add_edge(
        ib,
        ia,
        RoadEdge {
            way_id: a * 1000 + b,
            geometry: vec![cb, ca],
            length_meters,
            tags,
        },
    );
}

/// ~111 km trunk road along the equator (nodes 1..=11 every 0.1 deg of
/// longitude) and a 2.2 km side road north from node 6 to node 100.
#[allow(dead_code)]
pub fn highway_graph() -> RoadGraph {
    let mut graph = RoadGraph::new();
    for i in 0..=10 {
        graph.add_node(i + 1, coord(0.0, i as f64 * 0.1));
    }
    graph.add_node(100, coord(0.02, 0.5));

    for i in 1..=10 {
        two_way(
            &mut graph,
            i,
            i + 1,
            &[("highway", "trunk"), ("ref", "BR-101"), ("maxspeed", "100")],
        );
    }
    two_way(&mut graph, 6, 100, &[("highway", "residential"), ("name", "Estrada da Cantina")]);
    graph
}

#[allow(dead_code)]
pub fn poi(id: &str, location: Coordinates, tags: &[(&str, &str)]) -> Poi {
    let tags: HashMap<String, String> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Poi::from_tags(id.to_string(), location, tags).unwrap()
}

/// Six POIs along [`highway_graph`]: three usable, one abandoned, one
/// with too little data and one too far from the road.
#[allow(dead_code)]
pub fn route_pois() -> Vec<Poi> {
    vec![
        poi(
            "node/1",
            coord(0.001, 0.3),
            &[("amenity", "fuel"), ("name", "Posto Graal"), ("brand", "Shell")],
        ),
        poi(
            "node/2",
            coord(0.0201, 0.5),
            &[
                ("amenity", "restaurant"),
                ("name", "Cantina"),
                ("cuisine", "italian"),
                ("phone", "123"),
            ],
        ),
        poi(
            "node/3",
            coord(0.001, 0.7),
            &[("amenity", "fuel"), ("name", "Posto Velho"), ("brand", "Esso"), ("disused", "yes")],
        ),
        poi("node/4", coord(0.001, 0.8), &[("amenity", "fuel")]),
        poi(
            "way/5",
            coord(0.5, 0.5),
            &[
                ("tourism", "hotel"),
                ("name", "Hotel Distante"),
                ("phone", "1"),
                ("website", "w"),
            ],
        ),
        poi(
            "node/6",
            coord(0.0, 0.9),
            &[("barrier", "toll_booth"), ("name", "Praça de Pedágio")],
        ),
    ]
}

#[allow(dead_code)]
pub fn test_config() -> LinearMapConfig {
    LinearMapConfig {
        segment_length_km: 10.0,
        ..LinearMapConfig::default()
    }
}

#[allow(dead_code)]
pub fn build_service(
    geocoder: Arc<FakeGeocoder>,
    roads: Arc<FakeRoadSource>,
    pois: Arc<FakePoiSource>,
) -> LinearMapService {
    LinearMapService::new(geocoder, RoadGraphBuilder::new(roads), pois, test_config())
}

/// Set RUN_REAL_API_TESTS to hit the public Overpass and Nominatim servers
#[allow(dead_code)]
pub fn should_run_real_api_tests() -> bool {
    std::env::var("RUN_REAL_API_TESTS").is_ok()
}
