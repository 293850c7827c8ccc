use crate::constants::JUNCTION_SEARCH_MIN_OFFSET_M;
use crate::models::{Coordinates, JunctionInfo, RoadSegment, RoadSide, Route};
use crate::services::geometry::{direction_at, path_length_km, side_of, Vec2};
use crate::services::road_graph::RoadGraph;
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

/// Finds where the access path from an off-road POI joins the route.
pub struct JunctionFinder<'a> {
    graph: &'a RoadGraph,
    route: &'a Route,
    route_nodes: HashSet<NodeIndex>,
    /// Route distance per km of geometry length
    scale: f64,
}

impl<'a> JunctionFinder<'a> {
    pub fn new(graph: &'a RoadGraph, segments: &[RoadSegment], route: &'a Route) -> Self {
        let route_nodes = segments
            .iter()
            .flat_map(|s| [s.start_node_id, s.end_node_id])
            .filter_map(|osm_id| graph.node_index(osm_id))
            .collect();

        let geometry_km = path_length_km(&route.geometry);
        let scale = if geometry_km > 0.0 {
            route.total_distance_km / geometry_km
        } else {
            1.0
        };

        JunctionFinder {
            graph,
            route,
            route_nodes,
            scale,
        }
    }

    /// `None` when the POI sits on the route, when the route itself is the
    /// closest road, or when no access path exists.
    pub fn find(&self, poi: &Coordinates) -> Option<JunctionInfo> {
        let offset = poi.project_onto_path(&self.route.geometry)?;
        if offset.distance_km * 1000.0 <= JUNCTION_SEARCH_MIN_OFFSET_M {
            return None;
        }

        // Graph nodes only exist at intersections, so the nearest one can be
        // kilometres away along the route. A side road only counts when the
        // POI is closer to it than to the route.
        let (poi_node, poi_offset_km) = self.graph.nearest_node(poi)?;
        if self.route_nodes.contains(&poi_node) || poi_offset_km >= offset.distance_km {
            return None;
        }

        let (path_km, nodes) = astar(
            self.graph.inner(),
            poi_node,
            |n| self.route_nodes.contains(&n),
            |e| e.weight().length_meters,
            |_| 0.0,
        )
        .map(|(meters, nodes)| (meters / 1000.0, nodes))?;

        let junction_node = *nodes.last()?;
        let junction = self.graph.node(junction_node).location;
        let on_route = junction.project_onto_path(&self.route.geometry)?;

        let access = self
            .access_direction(&nodes, &junction)
            .unwrap_or_else(|| Vec2::between(&offset.point, poi));
        let side = direction_at(&self.route.geometry, on_route.segment_index)
            .map(|road| side_of(&road, &access))
            .unwrap_or(RoadSide::Center);

        Some(JunctionInfo {
            junction_distance_km: (on_route.distance_along_km * self.scale)
                .clamp(0.0, self.route.total_distance_km),
            junction_coordinates: junction,
            access_route_distance_km: path_km + poi_offset_km,
            side,
        })
    }

    /// Vector from the junction to the next point along the access path
    /// (walking away from the route).
    fn access_direction(&self, nodes: &[NodeIndex], junction: &Coordinates) -> Option<Vec2> {
        let [.., before, last] = nodes else {
            return None;
        };
        let edge = self
            .graph
            .inner()
            .edges_connecting(*before, *last)
            .min_by(|a, b| {
                a.weight()
                    .length_meters
                    .total_cmp(&b.weight().length_meters)
            })?;

        // Edge geometry runs towards the junction; take its second to last vertex
        let geometry = &edge.weight().geometry;
        let next = match geometry.len() {
            0 | 1 => self.graph.node(*before).location,
            n => geometry[n - 2],
        };
        let v = Vec2::between(junction, &next);
        (!v.is_zero()).then_some(v)
    }
}
