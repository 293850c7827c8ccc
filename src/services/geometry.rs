//! Small planar helpers over lat/lng.
//!
//! Vectors use x = longitude, y = latitude in degrees. That is fine for the
//! sign of a cross product and for interpolation along short polyline pieces;
//! anything that needs real lengths goes through the haversine distance on
//! [`Coordinates`].

use crate::models::{Coordinates, RoadSide};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Vector pointing from `from` to `to`.
    pub fn between(from: &Coordinates, to: &Coordinates) -> Self {
        Vec2 {
            x: to.lng - from.lng,
            y: to.lat - from.lat,
        }
    }

    pub fn dot(&self, other: &Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product
    pub fn cross(&self, other: &Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn is_zero(&self) -> bool {
        self.x.abs() < 1e-12 && self.y.abs() < 1e-12
    }
}

/// Which side of the road `access` points to, relative to travel along `road`.
/// Positive cross product is a counter-clockwise turn, i.e. left.
pub fn side_of(road: &Vec2, access: &Vec2) -> RoadSide {
    if road.is_zero() || access.is_zero() {
        return RoadSide::Center;
    }
    let cross = road.cross(access);
    if cross > 0.0 {
        RoadSide::Left
    } else if cross < 0.0 {
        RoadSide::Right
    } else {
        RoadSide::Center
    }
}

/// Travel direction of `path` around vertex/segment `segment_index`.
/// Degenerate (repeated) vertices are skipped.
pub fn direction_at(path: &[Coordinates], segment_index: usize) -> Option<Vec2> {
    if path.len() < 2 {
        return None;
    }
    let start = segment_index.min(path.len() - 2);

    // Look forward first, then backward
    for i in start..path.len() - 1 {
        let v = Vec2::between(&path[i], &path[i + 1]);
        if !v.is_zero() {
            return Some(v);
        }
    }
    for i in (0..start).rev() {
        let v = Vec2::between(&path[i], &path[i + 1]);
        if !v.is_zero() {
            return Some(v);
        }
    }
    None
}

/// Haversine length of a polyline in km
pub fn path_length_km(path: &[Coordinates]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Cumulative haversine distance (km) at every vertex; first entry is 0.
pub fn cumulative_distances_km(path: &[Coordinates]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(path.len());
    let mut total = 0.0;
    for (i, point) in path.iter().enumerate() {
        if i > 0 {
            total += path[i - 1].distance_to(point);
        }
        cumulative.push(total);
    }
    cumulative
}

/// Point at `distance_km` along the path, linearly interpolated inside the
/// containing piece. Distances outside the path clamp to its ends.
pub fn interpolate_along(
    path: &[Coordinates],
    cumulative: &[f64],
    distance_km: f64,
) -> Option<Coordinates> {
    let first = *path.first()?;
    let last = *path.last()?;
    let total = *cumulative.last()?;

    if distance_km <= 0.0 {
        return Some(first);
    }
    if distance_km >= total {
        return Some(last);
    }

    // First vertex at or beyond the target distance
    let idx = cumulative.partition_point(|&d| d < distance_km);
    if idx == 0 {
        return Some(first);
    }

    let piece = cumulative[idx] - cumulative[idx - 1];
    if piece <= 0.0 {
        return Some(path[idx]);
    }
    let t = (distance_km - cumulative[idx - 1]) / piece;
    Some(path[idx - 1].lerp(&path[idx], t))
}

/// Axis-aligned bounding box in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn around(a: &Coordinates, b: &Coordinates) -> Self {
        BoundingBox {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    pub fn padded(&self, degrees: f64) -> Self {
        BoundingBox {
            south: (self.south - degrees).max(-90.0),
            west: (self.west - degrees).max(-180.0),
            north: (self.north + degrees).min(90.0),
            east: (self.east + degrees).min(180.0),
        }
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }
}
