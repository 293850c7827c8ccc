use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, CoverageWarning, HighwayFilter};
use crate::services::geometry::BoundingBox;
use crate::services::overpass::{query_header, OverpassClient};
use crate::services::road_graph::RoadGraph;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Graph-fetch primitives. Each returns an empty graph rather than an error
/// when the area simply has no matching roads.
#[async_trait]
pub trait RoadNetworkSource: Send + Sync {
    async fn fetch_bbox(&self, bbox: &BoundingBox, filter: &HighwayFilter) -> Result<RoadGraph>;

    async fn fetch_place(&self, place: &str, filter: &HighwayFilter) -> Result<RoadGraph>;

    async fn fetch_point(
        &self,
        center: &Coordinates,
        radius_m: f64,
        filter: &HighwayFilter,
    ) -> Result<RoadGraph>;
}

/// Road network fetched from Overpass way queries.
pub struct OverpassRoadSource {
    client: OverpassClient,
}

impl OverpassRoadSource {
    pub fn new(client: OverpassClient) -> Self {
        OverpassRoadSource { client }
    }

    fn bbox_query(bbox: &BoundingBox, filter: &HighwayFilter) -> String {
        format!(
            "{}(way{}({},{},{},{}););(._;>;);out body;",
            query_header(),
            filter.overpass_predicate(),
            bbox.south,
            bbox.west,
            bbox.north,
            bbox.east
        )
    }

    fn place_query(place: &str, filter: &HighwayFilter) -> String {
        // "São Paulo, SP" -> area named "São Paulo"
        let name = place.split(',').next().unwrap_or(place).trim();
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            r#"{}area["name"="{}"]["boundary"="administrative"]->.searchArea;(way{}(area.searchArea););(._;>;);out body;"#,
            query_header(),
            escaped,
            filter.overpass_predicate()
        )
    }

    fn point_query(center: &Coordinates, radius_m: f64, filter: &HighwayFilter) -> String {
        format!(
            "{}(way{}(around:{:.0},{},{}););(._;>;);out body;",
            query_header(),
            filter.overpass_predicate(),
            radius_m,
            center.lat,
            center.lng
        )
    }
}

#[async_trait]
impl RoadNetworkSource for OverpassRoadSource {
    async fn fetch_bbox(&self, bbox: &BoundingBox, filter: &HighwayFilter) -> Result<RoadGraph> {
        let query = Self::bbox_query(bbox, filter);
        let response = self.client.execute(&query, "Road network bbox query").await?;
        // Edge truncation: ways crossing the box border keep their outside ends
        Ok(RoadGraph::from_overpass(&response).truncate_to_bbox(bbox))
    }

    async fn fetch_place(&self, place: &str, filter: &HighwayFilter) -> Result<RoadGraph> {
        let query = Self::place_query(place, filter);
        let response = self.client.execute(&query, "Road network place query").await?;
        Ok(RoadGraph::from_overpass(&response))
    }

    async fn fetch_point(
        &self,
        center: &Coordinates,
        radius_m: f64,
        filter: &HighwayFilter,
    ) -> Result<RoadGraph> {
        let query = Self::point_query(center, radius_m, filter);
        let response = self.client.execute(&query, "Road network radius query").await?;
        Ok(RoadGraph::from_overpass(&response))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    Local,
    Intercity,
}

impl RouteScope {
    pub fn classify(straight_line_km: f64) -> Self {
        if straight_line_km > INTERCITY_THRESHOLD_KM {
            RouteScope::Intercity
        } else {
            RouteScope::Local
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStrategy {
    BoundingBox { bbox: BoundingBox, padding_deg: f64 },
    MidpointRadius { center: Coordinates, radius_km: f64 },
    OriginPlace { filtered: bool },
    DestinationPlace,
    CoordinateRadius { center: Coordinates, radius_km: f64 },
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::BoundingBox { padding_deg, .. } => {
                write!(f, "bounding box (padding {:.2} deg)", padding_deg)
            }
            FetchStrategy::MidpointRadius { radius_km, .. } => {
                write!(f, "midpoint radius ({:.0} km)", radius_km)
            }
            FetchStrategy::OriginPlace { filtered: true } => write!(f, "origin place (filtered)"),
            FetchStrategy::OriginPlace { filtered: false } => {
                write!(f, "origin place (unfiltered)")
            }
            FetchStrategy::DestinationPlace => write!(f, "destination place"),
            FetchStrategy::CoordinateRadius { radius_km, .. } => {
                write!(f, "coordinate radius ({:.0} km)", radius_km)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphRequest {
    pub origin_name: String,
    pub destination_name: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub filter: HighwayFilter,
}

impl GraphRequest {
    pub fn straight_line_km(&self) -> f64 {
        self.origin.distance_to(&self.destination)
    }
}

pub struct BuiltGraph {
    pub graph: RoadGraph,
    pub scope: RouteScope,
    pub strategy: FetchStrategy,
    pub warnings: Vec<CoverageWarning>,
}

/// Proportional bounding-box padding, clamped to [0.1, 0.3] degrees.
pub fn bbox_padding_deg(straight_line_km: f64) -> f64 {
    (straight_line_km * BBOX_PADDING_DEG_PER_KM).clamp(BBOX_PADDING_MIN_DEG, BBOX_PADDING_MAX_DEG)
}

/// Ordered list of fetch attempts for a request.
pub fn plan_strategies(request: &GraphRequest) -> (RouteScope, Vec<(FetchStrategy, HighwayFilter)>) {
    let straight_line_km = request.straight_line_km();
    let scope = RouteScope::classify(straight_line_km);
    let midpoint = request.origin.midpoint(&request.destination);

    let filter = if straight_line_km > LONG_ROUTE_THRESHOLD_KM {
        HighwayFilter::MajorOnly
    } else {
        request.filter.clone()
    };

    let mut plan = Vec::new();

    if scope == RouteScope::Intercity {
        let padding_deg = bbox_padding_deg(straight_line_km);
        let bbox = BoundingBox::around(&request.origin, &request.destination).padded(padding_deg);
        plan.push((FetchStrategy::BoundingBox { bbox, padding_deg }, filter.clone()));

        let radius_km = (straight_line_km * MIDPOINT_RADIUS_FACTOR).min(MIDPOINT_RADIUS_CAP_KM);
        plan.push((
            FetchStrategy::MidpointRadius {
                center: midpoint,
                radius_km,
            },
            filter.clone(),
        ));
    }

    plan.push((FetchStrategy::OriginPlace { filtered: true }, filter.clone()));
    plan.push((FetchStrategy::OriginPlace { filtered: false }, HighwayFilter::Any));
    plan.push((FetchStrategy::DestinationPlace, filter.clone()));

    let fallback_radius_km = match scope {
        RouteScope::Local => LOCAL_FALLBACK_RADIUS_KM,
        RouteScope::Intercity => INTERCITY_FALLBACK_RADIUS_KM,
    };
    plan.push((
        FetchStrategy::CoordinateRadius {
            center: midpoint,
            radius_km: fallback_radius_km,
        },
        filter,
    ));

    (scope, plan)
}

pub struct RoadGraphBuilder {
    source: Arc<dyn RoadNetworkSource>,
}

impl RoadGraphBuilder {
    pub fn new(source: Arc<dyn RoadNetworkSource>) -> Self {
        RoadGraphBuilder { source }
    }

    /// Try each planned strategy in order until one yields a non-empty graph.
    #[instrument(skip(self, request), fields(origin = %request.origin_name, destination = %request.destination_name))]
    pub async fn build(&self, request: &GraphRequest) -> Result<BuiltGraph> {
        let straight_line_km = request.straight_line_km();
        let (scope, plan) = plan_strategies(request);

        tracing::info!(
            scope = ?scope,
            straight_line_km = %format!("{:.1}", straight_line_km),
            "Building road graph: {:?} route, {:.1}km straight line, {} strategies planned",
            scope, straight_line_km, plan.len()
        );

        let attempts = plan.len();
        for (strategy, filter) in plan {
            let result = match &strategy {
                FetchStrategy::BoundingBox { bbox, .. } => self.source.fetch_bbox(bbox, &filter).await,
                FetchStrategy::MidpointRadius { center, radius_km }
                | FetchStrategy::CoordinateRadius { center, radius_km } => {
                    self.source
                        .fetch_point(center, radius_km * 1000.0, &filter)
                        .await
                }
                FetchStrategy::OriginPlace { .. } => {
                    self.source.fetch_place(&request.origin_name, &filter).await
                }
                FetchStrategy::DestinationPlace => {
                    self.source
                        .fetch_place(&request.destination_name, &filter)
                        .await
                }
            };

            let graph = match result {
                Ok(graph) if !graph.is_empty() => graph,
                Ok(_) => {
                    tracing::warn!("Road graph strategy '{}' returned 0 nodes", strategy);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Road graph strategy '{}' failed: {}", strategy, e);
                    continue;
                }
            };

            tracing::info!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Road graph built with '{}': {} nodes, {} edges",
                strategy, graph.node_count(), graph.edge_count()
            );

            let warnings = check_node_offsets(&graph, request, scope);
            return Ok(BuiltGraph {
                graph,
                scope,
                strategy,
                warnings,
            });
        }

        Err(AppError::NoRoadNetwork(format!(
            "all {} graph fetch strategies returned no road nodes between '{}' and '{}'",
            attempts, request.origin_name, request.destination_name
        )))
    }
}

fn check_node_offsets(
    graph: &RoadGraph,
    request: &GraphRequest,
    scope: RouteScope,
) -> Vec<CoverageWarning> {
    let threshold_km = match scope {
        RouteScope::Local => LOCAL_NODE_OFFSET_WARN_KM,
        RouteScope::Intercity => INTERCITY_NODE_OFFSET_WARN_KM,
    };

    [
        ("origin", &request.origin),
        ("destination", &request.destination),
    ]
    .into_iter()
    .filter_map(|(endpoint, point)| {
        let (_, offset_km) = graph.nearest_node(point)?;
        (offset_km > threshold_km).then(|| CoverageWarning::NodeOffset {
            endpoint: endpoint.to_string(),
            offset_km,
            threshold_km,
        })
    })
    .inspect(CoverageWarning::log)
    .collect()
}
