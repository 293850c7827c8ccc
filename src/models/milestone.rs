use crate::models::{Coordinates, PoiCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneType {
    GasStation,
    Restaurant,
    Hotel,
    Camping,
    Hospital,
    TollBooth,
    City,
    Town,
    Village,
    Other,
}

impl MilestoneType {
    /// Resolve the milestone type. A `place` tag of city/town/village
    /// overrides the category table.
    pub fn resolve(category: PoiCategory, place_tag: Option<&str>) -> Self {
        match place_tag {
            Some("city") => return MilestoneType::City,
            Some("town") => return MilestoneType::Town,
            Some("village") => return MilestoneType::Village,
            _ => {}
        }

        match category {
            PoiCategory::Fuel => MilestoneType::GasStation,
            c if c.is_food() => MilestoneType::Restaurant,
            PoiCategory::Hotel => MilestoneType::Hotel,
            PoiCategory::Camping => MilestoneType::Camping,
            PoiCategory::Hospital => MilestoneType::Hospital,
            PoiCategory::TollBooth => MilestoneType::TollBooth,
            PoiCategory::City => MilestoneType::City,
            PoiCategory::Town => MilestoneType::Town,
            PoiCategory::Village => MilestoneType::Village,
            _ => MilestoneType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneType::GasStation => "gas_station",
            MilestoneType::Restaurant => "restaurant",
            MilestoneType::Hotel => "hotel",
            MilestoneType::Camping => "camping",
            MilestoneType::Hospital => "hospital",
            MilestoneType::TollBooth => "toll_booth",
            MilestoneType::City => "city",
            MilestoneType::Town => "town",
            MilestoneType::Village => "village",
            MilestoneType::Other => "other",
        }
    }
}

impl fmt::Display for MilestoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoadSide {
    Left,
    Right,
    /// On-road features such as toll booths
    Center,
}

/// Where an off-road POI's access path leaves the main route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JunctionInfo {
    pub junction_distance_km: f64,
    pub junction_coordinates: Coordinates,
    pub access_route_distance_km: f64,
    pub side: RoadSide,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub milestone_type: MilestoneType,
    pub category: PoiCategory,
    pub coordinates: Coordinates,
    pub distance_from_origin_km: f64,
    pub distance_from_road_meters: f64,
    pub side: RoadSide,
    pub quality_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub junction_distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub junction_coordinates: Option<Coordinates>,
    pub requires_detour: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub amenities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_table() {
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Fuel, None),
            MilestoneType::GasStation
        );
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Bakery, None),
            MilestoneType::Restaurant
        );
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Parking, None),
            MilestoneType::Other
        );
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Services, None),
            MilestoneType::Other
        );
    }

    #[test]
    fn test_place_tag_overrides_category() {
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Parking, Some("village")),
            MilestoneType::Village
        );
        assert_eq!(
            MilestoneType::resolve(PoiCategory::Hotel, Some("hamlet")),
            MilestoneType::Hotel
        );
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&MilestoneType::GasStation).unwrap();
        assert_eq!(json, "\"gas_station\"");
        let json = serde_json::to_string(&RoadSide::Center).unwrap();
        assert_eq!(json, "\"center\"");
    }
}
