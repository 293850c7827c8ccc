//! Routable road graph built from Overpass way/node elements.

use crate::models::Coordinates;
use crate::services::geometry::{path_length_km, BoundingBox};
use crate::services::overpass::OverpassResponse;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    pub osm_id: i64,
    pub location: Coordinates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    pub way_id: i64,
    /// Polyline from source to target node, both included
    pub geometry: Vec<Coordinates>,
    pub length_meters: f64,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, PartialEq)]
enum Direction {
    Forward,
    Backward,
    Both,
}

impl Direction {
    fn from_tags(tags: &HashMap<String, String>) -> Self {
        match tags.get("oneway").map(String::as_str) {
            Some("yes") | Some("true") | Some("1") => Direction::Forward,
            Some("-1") | Some("reverse") => Direction::Backward,
            _ if tags.get("junction").map(String::as_str) == Some("roundabout") => {
                Direction::Forward
            }
            _ => Direction::Both,
        }
    }
}

/// Directed multigraph: parallel edges between the same nodes are kept.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    graph: DiGraph<RoadNode, RoadEdge>,
    by_osm_id: HashMap<i64, NodeIndex>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn inner(&self) -> &DiGraph<RoadNode, RoadEdge> {
        &self.graph
    }

    pub fn node(&self, index: NodeIndex) -> &RoadNode {
        &self.graph[index]
    }

    pub fn node_index(&self, osm_id: i64) -> Option<NodeIndex> {
        self.by_osm_id.get(&osm_id).copied()
    }

    /// Insert a node, or return the existing index for that OSM id.
    pub fn add_node(&mut self, osm_id: i64, location: Coordinates) -> NodeIndex {
        if let Some(&index) = self.by_osm_id.get(&osm_id) {
            return index;
        }
        let index = self.graph.add_node(RoadNode { osm_id, location });
        self.by_osm_id.insert(osm_id, index);
        index
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: RoadEdge) -> EdgeIndex {
        self.graph.add_edge(from, to, edge)
    }

    /// Build from an Overpass `out body` response containing ways plus their
    /// nodes. Ways are split at intersections so each edge spans the chain of
    /// nodes between two intersections (or way ends).
    pub fn from_overpass(response: &OverpassResponse) -> Self {
        let mut locations: HashMap<i64, Coordinates> = HashMap::new();
        let mut ways = Vec::new();

        for element in &response.elements {
            match element.element_type.as_str() {
                "node" => {
                    if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                        if let Ok(location) = Coordinates::new(lat, lon) {
                            locations.insert(element.id, location);
                        }
                    }
                }
                "way" if element.tags.contains_key("highway") => {
                    if let Some(nodes) = &element.nodes {
                        ways.push((element.id, nodes, &element.tags));
                    }
                }
                _ => {}
            }
        }

        // How many times each node is referenced by any way
        let mut usage: HashMap<i64, usize> = HashMap::new();
        for (_, nodes, _) in &ways {
            for id in nodes.iter() {
                *usage.entry(*id).or_insert(0) += 1;
            }
        }

        let mut graph = RoadGraph::new();
        let mut skipped_refs = 0usize;

        for (way_id, nodes, tags) in ways {
            let resolved: Vec<(i64, Coordinates)> = nodes
                .iter()
                .filter_map(|id| locations.get(id).map(|loc| (*id, *loc)))
                .collect();
            skipped_refs += nodes.len() - resolved.len();

            if resolved.len() < 2 {
                continue;
            }

            let direction = Direction::from_tags(tags);
            let last = resolved.len() - 1;
            let mut chain_start = 0;

            for i in 1..resolved.len() {
                let is_split = i == last || usage.get(&resolved[i].0).copied().unwrap_or(0) > 1;
                if !is_split {
                    continue;
                }

                let chain = &resolved[chain_start..=i];
                let geometry: Vec<Coordinates> = chain.iter().map(|(_, loc)| *loc).collect();
                let length_meters = path_length_km(&geometry) * 1000.0;

                let from = graph.add_node(chain[0].0, chain[0].1);
                let to = graph.add_node(resolved[i].0, resolved[i].1);

                if direction != Direction::Backward {
                    graph.add_edge(
                        from,
                        to,
                        RoadEdge {
                            way_id,
                            geometry: geometry.clone(),
                            length_meters,
                            tags: tags.clone(),
                        },
                    );
                }
                if direction != Direction::Forward {
                    let mut reversed = geometry;
                    reversed.reverse();
                    graph.add_edge(
                        to,
                        from,
                        RoadEdge {
                            way_id,
                            geometry: reversed,
                            length_meters,
                            tags: tags.clone(),
                        },
                    );
                }

                chain_start = i;
            }
        }

        if skipped_refs > 0 {
            tracing::debug!("Skipped {} way node references without coordinates", skipped_refs);
        }

        graph
    }

    /// Keep every edge with at least one endpoint inside `bbox`; nodes left
    /// without edges are dropped.
    pub fn truncate_to_bbox(&self, bbox: &BoundingBox) -> RoadGraph {
        let mut truncated = RoadGraph::new();

        for edge in self.graph.edge_references() {
            let source = &self.graph[edge.source()];
            let target = &self.graph[edge.target()];
            if !bbox.contains(&source.location) && !bbox.contains(&target.location) {
                continue;
            }
            let from = truncated.add_node(source.osm_id, source.location);
            let to = truncated.add_node(target.osm_id, target.location);
            truncated.add_edge(from, to, edge.weight().clone());
        }

        truncated
    }

    /// Closest node and its distance in km
    pub fn nearest_node(&self, point: &Coordinates) -> Option<(NodeIndex, f64)> {
        self.graph
            .node_indices()
            .map(|index| (index, self.graph[index].location.distance_to(point)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> OverpassResponse {
        serde_json::from_str(json).unwrap()
    }

    /// Two ways crossing at node 3:
    ///   way 10: 1 - 2 - 3 - 4   (two-way)
    ///   way 20: 5 - 3           (oneway)
    fn crossing() -> OverpassResponse {
        response(
            r#"{"elements":[
            {"type":"way","id":10,"nodes":[1,2,3,4],"tags":{"highway":"primary","name":"Via Dutra"}},
            {"type":"way","id":20,"nodes":[5,3],"tags":{"highway":"residential","oneway":"yes"}},
            {"type":"way","id":30,"nodes":[1,4],"tags":{"building":"yes"}},
            {"type":"node","id":1,"lat":0.0,"lon":0.0},
            {"type":"node","id":2,"lat":0.0,"lon":0.01},
            {"type":"node","id":3,"lat":0.0,"lon":0.02},
            {"type":"node","id":4,"lat":0.0,"lon":0.03},
            {"type":"node","id":5,"lat":0.01,"lon":0.02}
        ]}"#,
        )
    }

    #[test]
    fn test_ways_split_at_intersections() {
        let graph = RoadGraph::from_overpass(&crossing());

        // Node 2 is interior to way 10 and not an intersection
        assert!(graph.node_index(2).is_none());
        assert_eq!(graph.node_count(), 4);
        // 1<->3, 3<->4 both directions, 5->3 forward only
        assert_eq!(graph.edge_count(), 5);

        let n1 = graph.node_index(1).unwrap();
        let n3 = graph.node_index(3).unwrap();
        let edge = graph.inner().edges_connecting(n1, n3).next().unwrap();
        assert_eq!(edge.weight().geometry.len(), 3);
        assert_eq!(edge.weight().way_id, 10);
        // 0.02 deg of longitude at the equator
        assert!((edge.weight().length_meters - 2223.9).abs() < 1.0);

        let n5 = graph.node_index(5).unwrap();
        assert_eq!(graph.inner().edges_connecting(n5, n3).count(), 1);
        assert_eq!(graph.inner().edges_connecting(n3, n5).count(), 0);
    }

    #[test]
    fn test_reverse_edge_geometry_is_reversed() {
        let graph = RoadGraph::from_overpass(&crossing());
        let n1 = graph.node_index(1).unwrap();
        let n3 = graph.node_index(3).unwrap();
        let back = graph.inner().edges_connecting(n3, n1).next().unwrap();
        assert_eq!(back.weight().geometry[0], graph.node(n3).location);
        assert_eq!(back.weight().geometry[2], graph.node(n1).location);
    }

    #[test]
    fn test_oneway_backward() {
        let graph = RoadGraph::from_overpass(&response(
            r#"{"elements":[
            {"type":"way","id":1,"nodes":[1,2],"tags":{"highway":"trunk","oneway":"-1"}},
            {"type":"node","id":1,"lat":0.0,"lon":0.0},
            {"type":"node","id":2,"lat":0.0,"lon":0.01}
        ]}"#,
        ));
        let n1 = graph.node_index(1).unwrap();
        let n2 = graph.node_index(2).unwrap();
        assert_eq!(graph.inner().edges_connecting(n1, n2).count(), 0);
        assert_eq!(graph.inner().edges_connecting(n2, n1).count(), 1);
    }

    #[test]
    fn test_truncate_keeps_edges_crossing_the_border() {
        let graph = RoadGraph::from_overpass(&crossing());
        let bbox = BoundingBox {
            south: -1.0,
            west: -1.0,
            north: 1.0,
            east: 0.005,
        };
        let truncated = graph.truncate_to_bbox(&bbox);

        // Only node 1 is inside; its edges to node 3 survive, 3<->4 and 5->3 do not
        assert_eq!(truncated.edge_count(), 2);
        assert_eq!(truncated.node_count(), 2);
        assert!(truncated.node_index(4).is_none());
    }

    #[test]
    fn test_nearest_node() {
        let graph = RoadGraph::from_overpass(&crossing());
        let (index, offset_km) = graph
            .nearest_node(&Coordinates { lat: 0.001, lng: 0.029 })
            .unwrap();
        assert_eq!(graph.node(index).osm_id, 4);
        assert!(offset_km < 0.2);

        assert!(RoadGraph::new().nearest_node(&Coordinates { lat: 0.0, lng: 0.0 }).is_none());
    }
}
