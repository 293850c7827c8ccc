use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Closest point on a polyline to some query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProjection {
    /// Straight-line distance from the query point to `point`, in km
    pub distance_km: f64,
    /// Index of the polyline segment containing `point`
    pub segment_index: usize,
    /// Distance along the polyline from its first vertex to `point`, in km
    pub distance_along_km: f64,
    pub point: Coordinates,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }

    /// Linear interpolation in degree space, `t` in [0, 1]
    pub fn lerp(&self, other: &Coordinates, t: f64) -> Coordinates {
        Coordinates {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }

    /// Closest point on segment p1-p2.
    /// Returns (closest point, t) where t is the position along the segment [0,1]
    pub fn project_onto_segment(&self, p1: &Coordinates, p2: &Coordinates) -> (Coordinates, f64) {
        let dx = p2.lng - p1.lng;
        let dy = p2.lat - p1.lat;
        let len_sq = dx * dx + dy * dy;

        if len_sq < 1e-20 {
            return (*p1, 0.0);
        }

        // Dot product in lat/lng space, good enough for short segments
        let t = ((self.lng - p1.lng) * dx + (self.lat - p1.lat) * dy) / len_sq;
        let t = t.clamp(0.0, 1.0);

        (p1.lerp(p2, t), t)
    }

    /// Find the closest point on a path.
    /// A single-point path projects onto that point; an empty path yields `None`.
    pub fn project_onto_path(&self, path: &[Coordinates]) -> Option<PathProjection> {
        match path {
            [] => return None,
            [only] => {
                return Some(PathProjection {
                    distance_km: self.distance_to(only),
                    segment_index: 0,
                    distance_along_km: 0.0,
                    point: *only,
                })
            }
            _ => {}
        }

        let mut best: Option<PathProjection> = None;
        let mut cumulative_distance = 0.0;

        for (i, window) in path.windows(2).enumerate() {
            let (closest, t) = self.project_onto_segment(&window[0], &window[1]);
            let dist = self.distance_to(&closest);
            let segment_length = window[0].distance_to(&window[1]);

            if best.map_or(true, |b| dist < b.distance_km) {
                best = Some(PathProjection {
                    distance_km: dist,
                    segment_index: i,
                    distance_along_km: cumulative_distance + t * segment_length,
                    point: closest,
                });
            }

            cumulative_distance += segment_length;
        }

        best
    }
}
