use crate::error::{AppError, Result};
use crate::models::{Coordinates, RoadSegment};
use crate::services::geometry::path_length_km;
use crate::services::road_graph::{RoadEdge, RoadGraph};
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

/// Shortest path by edge length between the nodes nearest to `origin` and
/// `destination`, as one [`RoadSegment`] per traversed edge.
pub fn extract_shortest_path(
    graph: &RoadGraph,
    origin: &Coordinates,
    destination: &Coordinates,
) -> Result<Vec<RoadSegment>> {
    let (start, start_offset_km) = graph
        .nearest_node(origin)
        .ok_or_else(|| AppError::NoRouteFound("road graph has no nodes".to_string()))?;
    let (goal, goal_offset_km) = graph
        .nearest_node(destination)
        .ok_or_else(|| AppError::NoRouteFound("road graph has no nodes".to_string()))?;

    tracing::debug!(
        "Snapped origin to node {} ({:.2}km), destination to node {} ({:.2}km)",
        graph.node(start).osm_id,
        start_offset_km,
        graph.node(goal).osm_id,
        goal_offset_km
    );

    if start == goal {
        return Err(AppError::NoRouteFound(format!(
            "origin and destination snap to the same road node {}",
            graph.node(start).osm_id
        )));
    }

    let nodes = shortest_node_path(graph, start, goal).ok_or_else(|| {
        AppError::NoRouteFound(format!(
            "no path between road nodes {} and {}",
            graph.node(start).osm_id,
            graph.node(goal).osm_id
        ))
    })?;

    let segments = segments_along(graph, &nodes);
    tracing::info!(
        "Shortest path: {} nodes, {} road segments",
        nodes.len(),
        segments.len()
    );
    Ok(segments)
}

/// Dijkstra via A* with a zero heuristic.
pub fn shortest_node_path(
    graph: &RoadGraph,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    astar(
        graph.inner(),
        start,
        |n| n == goal,
        |e| e.weight().length_meters,
        |_| 0.0,
    )
    .map(|(_, path)| path)
}

/// Every edge between consecutive path nodes becomes a segment, parallel
/// edges included.
fn segments_along(graph: &RoadGraph, nodes: &[NodeIndex]) -> Vec<RoadSegment> {
    let mut segments = Vec::new();

    for pair in nodes.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        for (k, edge) in graph.inner().edges_connecting(from, to).enumerate() {
            segments.push(to_segment(graph, from, to, k, edge.weight()));
        }
    }

    segments
}

fn to_segment(graph: &RoadGraph, from: NodeIndex, to: NodeIndex, key: usize, edge: &RoadEdge) -> RoadSegment {
    let start = graph.node(from);
    let end = graph.node(to);

    let geometry = if edge.geometry.len() >= 2 {
        edge.geometry.clone()
    } else {
        vec![start.location, end.location]
    };
    let length_meters = if edge.length_meters > 0.0 {
        edge.length_meters
    } else {
        path_length_km(&geometry) * 1000.0
    };

    let tag = |key: &str| {
        edge.tags
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    RoadSegment {
        id: format!("{}-{}-{}", start.osm_id, end.osm_id, key),
        name: tag("name"),
        highway_type: tag("highway")
            // "primary;secondary" style lists: first value wins
            .map(|h| h.split(';').next().unwrap_or_default().trim().to_string())
            .unwrap_or_else(|| "unclassified".to_string()),
        road_ref: tag("ref"),
        geometry,
        length_meters,
        start_node_id: start.osm_id,
        end_node_id: end.osm_id,
        tags: edge.tags.clone(),
    }
}
