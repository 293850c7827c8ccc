//! Data-quality policy for raw POIs: abandonment detection, a completeness
//! score, per-category acceptance thresholds and amenity extraction.

use std::collections::{BTreeSet, HashMap};

type Tags = HashMap<String, String>;

const LIFECYCLE_PREFIXES: &[&str] = &[
    "abandoned",
    "disused",
    "demolished",
    "razed",
    "removed",
    "ruins",
    "former",
    "closed",
    "destroyed",
];

const FOOD_AMENITIES: &[&str] = &[
    "restaurant",
    "fast_food",
    "cafe",
    "bar",
    "pub",
    "food_court",
    "ice_cream",
];

/// Number of completeness checks in [`quality_score`]
pub const QUALITY_CHECKS: usize = 7;

pub const FUEL_MIN_SCORE: f64 = 0.3;
pub const FOOD_MIN_SCORE: f64 = 0.4;
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

fn non_empty<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn has(tags: &Tags, key: &str) -> bool {
    non_empty(tags, key).is_some()
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "no" | "false" | "0"
    )
}

pub fn is_abandoned(tags: &Tags) -> bool {
    let lifecycle = tags.iter().any(|(key, value)| {
        LIFECYCLE_PREFIXES.iter().any(|prefix| {
            (key == prefix && is_truthy(value))
                || key
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':'))
        })
    });

    lifecycle
        || tags.get("opening_hours").is_some_and(|hours| {
            matches!(hours.trim().to_ascii_lowercase().as_str(), "closed" | "no")
        })
}

/// Mean of seven completeness checks. The denominator is always seven, and
/// non-restaurants pass the cuisine check automatically.
pub fn quality_score(tags: &Tags) -> f64 {
    let is_restaurant = tags.get("amenity").map(String::as_str) == Some("restaurant");

    let checks = [
        has(tags, "name"),
        has(tags, "brand") || has(tags, "operator"),
        has(tags, "phone") || has(tags, "contact:phone"),
        has(tags, "opening_hours"),
        has(tags, "website") || has(tags, "contact:website"),
        !is_restaurant || has(tags, "cuisine"),
        tags.iter()
            .any(|(key, value)| key.starts_with("addr:") && !value.trim().is_empty()),
    ];

    let passed = checks.iter().filter(|&&ok| ok).count();
    passed as f64 / QUALITY_CHECKS as f64
}

/// Category-specific acceptance. Abandoned POIs must be rejected before this.
pub fn meets_threshold(tags: &Tags, score: f64) -> bool {
    let amenity = tags.get("amenity").map(String::as_str);

    if amenity == Some("fuel") {
        let identified = has(tags, "name") || has(tags, "brand") || has(tags, "operator");
        return identified && score >= FUEL_MIN_SCORE;
    }

    let is_food = amenity.is_some_and(|a| FOOD_AMENITIES.contains(&a))
        || tags.get("shop").map(String::as_str) == Some("bakery");
    if is_food {
        return has(tags, "name") && score >= FOOD_MIN_SCORE;
    }

    if tags.get("barrier").map(String::as_str) == Some("toll_booth") {
        return true;
    }

    score >= DEFAULT_MIN_SCORE
}

/// Sorted, deduplicated amenity labels derived from presence tags.
pub fn extract_amenities(tags: &Tags) -> Vec<String> {
    let mut amenities = BTreeSet::new();
    let yes = |key: &str| {
        tags.get(key)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1"))
    };

    if let Some(internet) = tags.get("internet_access") {
        if matches!(internet.as_str(), "yes" | "wlan" | "wifi" | "free") {
            amenities.insert("wifi");
        }
    }
    if tags.get("parking").is_some_and(|p| p != "no") {
        amenities.insert("parking");
    }
    if yes("wheelchair") {
        amenities.insert("wheelchair_accessible");
    }

    for (key, value) in tags {
        let Some(method) = key.strip_prefix("payment:") else {
            continue;
        };
        if !is_truthy(value) {
            continue;
        }
        match method {
            "credit_cards" | "debit_cards" | "visa" | "mastercard" | "cards" => {
                amenities.insert("card_payment");
            }
            "cash" | "coins" => {
                amenities.insert("cash");
            }
            "contactless" => {
                amenities.insert("contactless");
            }
            _ => {}
        }
    }

    for (key, value) in tags {
        let Some(fuel) = key.strip_prefix("fuel:") else {
            continue;
        };
        if !is_truthy(value) {
            continue;
        }
        let label = match fuel {
            "diesel" | "HGV_diesel" => "diesel",
            "octane_91" | "octane_95" | "octane_98" | "e10" | "gasoline" => "gasoline",
            "ethanol" | "e85" | "e100" => "ethanol",
            "lpg" => "lpg",
            "cng" => "cng",
            _ => continue,
        };
        amenities.insert(label);
    }

    let toilets = tags.get("toilets").map(String::as_str);
    if yes("toilets") {
        amenities.insert("restroom");
    }
    // Fuel stations have restrooms unless explicitly denied
    if tags.get("amenity").map(String::as_str) == Some("fuel") && toilets != Some("no") {
        amenities.insert("restroom");
    }

    if tags.get("opening_hours").map(|h| h.trim()) == Some("24/7") {
        amenities.insert("24h");
    }

    amenities.into_iter().map(str::to_string).collect()
}
