use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Highway classes fetched for driving when no narrower filter applies.
const DRIVABLE_HIGHWAYS: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
];

const MAJOR_HIGHWAYS: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
];

/// Set of `highway=*` values a road-network fetch is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighwayFilter {
    /// Every drivable class
    Drivable,
    /// motorway / trunk / primary and their links
    MajorOnly,
    /// No restriction on the highway value
    Any,
}

impl HighwayFilter {
    /// Overpass QL tag predicate, e.g. `["highway"~"^(motorway|trunk)$"]`
    pub fn overpass_predicate(&self) -> String {
        match self {
            HighwayFilter::Drivable => {
                format!(r#"["highway"~"^({})$"]"#, DRIVABLE_HIGHWAYS.join("|"))
            }
            HighwayFilter::MajorOnly => {
                format!(r#"["highway"~"^({})$"]"#, MAJOR_HIGHWAYS.join("|"))
            }
            HighwayFilter::Any => r#"["highway"]"#.to_string(),
        }
    }
}

/// motorway / trunk / primary (links included)
pub fn is_major_highway(highway: &str) -> bool {
    MAJOR_HIGHWAYS.contains(&highway)
}

/// Classes that make up the urban fringe of an intercity route.
pub fn is_urban_highway(highway: &str) -> bool {
    matches!(highway, "residential" | "service" | "tertiary" | "secondary")
}

/// Assumed travel speed when a way has no usable `maxspeed`.
pub fn default_speed_kmh(highway: &str) -> f64 {
    match highway {
        "motorway" => 110.0,
        "trunk" => 90.0,
        "primary" => 70.0,
        "motorway_link" | "trunk_link" | "primary_link" => 50.0,
        "secondary" | "secondary_link" => 60.0,
        "tertiary" | "tertiary_link" => 50.0,
        "unclassified" => 40.0,
        "residential" => 30.0,
        _ => 20.0,
    }
}

/// One traversed edge of the shortest path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoadSegment {
    pub id: String,
    pub name: Option<String>,
    pub highway_type: String,
    #[serde(rename = "ref")]
    pub road_ref: Option<String>,
    pub geometry: Vec<Coordinates>,
    pub length_meters: f64,
    pub start_node_id: i64,
    pub end_node_id: i64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl RoadSegment {
    /// Speed from a numeric `maxspeed` tag ("80", "80 km/h", "50 mph"),
    /// otherwise the class default.
    pub fn speed_kmh(&self) -> f64 {
        self.tags
            .get("maxspeed")
            .and_then(|raw| parse_maxspeed(raw))
            .filter(|speed| *speed > 0.0)
            .unwrap_or_else(|| default_speed_kmh(&self.highway_type))
    }

    pub fn estimated_duration_secs(&self) -> f64 {
        (self.length_meters / 1000.0) / self.speed_kmh() * 3600.0
    }

    /// Human-readable label: name, then ref
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.road_ref.as_deref())
    }
}

fn parse_maxspeed(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some(mph) = raw.strip_suffix("mph") {
        return mph.trim().parse::<f64>().ok().map(|v| v * 1.609_344);
    }
    let numeric = raw.strip_suffix("km/h").unwrap_or(raw).trim();
    numeric.parse().ok()
}
