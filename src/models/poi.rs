use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tag predicates the spatial query asks for, as (key, accepted values).
pub const POI_QUERY_TAGS: &[(&str, &[&str])] = &[
    (
        "amenity",
        &[
            "fuel",
            "restaurant",
            "fast_food",
            "cafe",
            "bar",
            "pub",
            "food_court",
            "ice_cream",
            "hospital",
            "parking",
        ],
    ),
    ("shop", &["bakery"]),
    (
        "tourism",
        &["hotel", "motel", "guest_house", "hostel", "camp_site"],
    ),
    ("barrier", &["toll_booth"]),
    ("highway", &["services", "rest_area"]),
    ("place", &["city", "town", "village"]),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Fuel,
    Restaurant,
    FastFood,
    Cafe,
    Bar,
    Pub,
    FoodCourt,
    IceCream,
    Bakery,
    Hotel,
    Camping,
    Hospital,
    TollBooth,
    Services,
    RestArea,
    Parking,
    City,
    Town,
    Village,
}

impl PoiCategory {
    /// Infer the category from raw OSM tags.
    /// Order matters: a settlement tag wins, then amenity, shop, tourism, barrier, highway.
    pub fn from_tags(tags: &HashMap<String, String>) -> Option<Self> {
        if let Some(place) = tags.get("place") {
            match place.as_str() {
                "city" => return Some(PoiCategory::City),
                "town" => return Some(PoiCategory::Town),
                "village" => return Some(PoiCategory::Village),
                _ => {}
            }
        }

        let from_amenity = tags.get("amenity").and_then(|a| match a.as_str() {
            "fuel" => Some(PoiCategory::Fuel),
            "restaurant" => Some(PoiCategory::Restaurant),
            "fast_food" => Some(PoiCategory::FastFood),
            "cafe" => Some(PoiCategory::Cafe),
            "bar" => Some(PoiCategory::Bar),
            "pub" => Some(PoiCategory::Pub),
            "food_court" => Some(PoiCategory::FoodCourt),
            "ice_cream" => Some(PoiCategory::IceCream),
            "hospital" => Some(PoiCategory::Hospital),
            "parking" => Some(PoiCategory::Parking),
            _ => None,
        });

        from_amenity
            .or_else(|| {
                tags.get("shop")
                    .filter(|s| s.as_str() == "bakery")
                    .map(|_| PoiCategory::Bakery)
            })
            .or_else(|| {
                tags.get("tourism").and_then(|t| match t.as_str() {
                    "hotel" | "motel" | "guest_house" | "hostel" => Some(PoiCategory::Hotel),
                    "camp_site" => Some(PoiCategory::Camping),
                    _ => None,
                })
            })
            .or_else(|| {
                tags.get("barrier")
                    .filter(|b| b.as_str() == "toll_booth")
                    .map(|_| PoiCategory::TollBooth)
            })
            .or_else(|| {
                tags.get("highway").and_then(|h| match h.as_str() {
                    "services" => Some(PoiCategory::Services),
                    "rest_area" => Some(PoiCategory::RestArea),
                    _ => None,
                })
            })
    }

    pub fn is_food(&self) -> bool {
        matches!(
            self,
            PoiCategory::Restaurant
                | PoiCategory::FastFood
                | PoiCategory::Cafe
                | PoiCategory::Bar
                | PoiCategory::Pub
                | PoiCategory::FoodCourt
                | PoiCategory::IceCream
                | PoiCategory::Bakery
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::Fuel => "fuel",
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::FastFood => "fast_food",
            PoiCategory::Cafe => "cafe",
            PoiCategory::Bar => "bar",
            PoiCategory::Pub => "pub",
            PoiCategory::FoodCourt => "food_court",
            PoiCategory::IceCream => "ice_cream",
            PoiCategory::Bakery => "bakery",
            PoiCategory::Hotel => "hotel",
            PoiCategory::Camping => "camping",
            PoiCategory::Hospital => "hospital",
            PoiCategory::TollBooth => "toll_booth",
            PoiCategory::Services => "services",
            PoiCategory::RestArea => "rest_area",
            PoiCategory::Parking => "parking",
            PoiCategory::City => "city",
            PoiCategory::Town => "town",
            PoiCategory::Village => "village",
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw POI as returned by the spatial query, before any quality filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Poi {
    /// OSM element id qualified by type, e.g. `node/123`
    pub id: String,
    pub name: String,
    pub category: PoiCategory,
    pub location: Coordinates,
    pub tags: HashMap<String, String>,
}

impl Poi {
    /// Build from tags; `None` when the tags match no known category.
    /// Unnamed POIs fall back to brand, operator, then the category label.
    pub fn from_tags(
        id: String,
        location: Coordinates,
        tags: HashMap<String, String>,
    ) -> Option<Self> {
        let category = PoiCategory::from_tags(&tags)?;
        let name = ["name", "brand", "operator"]
            .iter()
            .find_map(|key| tags.get(*key).filter(|v| !v.trim().is_empty()))
            .cloned()
            .unwrap_or_else(|| category.to_string());

        Some(Poi {
            id,
            name,
            category,
            location,
            tags,
        })
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}
