//! Stable application-wide constants.
//!
//! Values here are structural thresholds of the linear-map pipeline and
//! default fallbacks for env-var-based configuration. Tuning knobs that
//! benefit from runtime experimentation live in
//! [`LinearMapConfig`](crate::config::LinearMapConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

/// Default linear map cache TTL: 6 hours. Overridden by `MAP_CACHE_TTL`.
pub const DEFAULT_MAP_CACHE_TTL_SECONDS: u64 = 21_600;
/// Maximum entries for the in-memory linear map cache.
pub const DEFAULT_MAP_CACHE_MAX_ENTRIES: u64 = 500;
/// Maximum entries for the geocode cache.
pub const DEFAULT_GEOCODE_CACHE_MAX_ENTRIES: u64 = 10_000;

// --- External services ---

/// Ordered Overpass endpoints: primary first, then fallbacks.
pub const DEFAULT_OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
    "https://maps.mail.ru/osm/tools/overpass/api/interpreter",
];
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "linearmap/0.1";
/// Server-side timeout embedded in every Overpass QL query.
pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 180;

// --- Road graph builder ---

/// Straight-line distance above which a route is intercity.
pub const INTERCITY_THRESHOLD_KM: f64 = 50.0;
/// Straight-line distance above which only motorway/trunk/primary are fetched.
pub const LONG_ROUTE_THRESHOLD_KM: f64 = 150.0;
pub const BBOX_PADDING_MIN_DEG: f64 = 0.1;
pub const BBOX_PADDING_MAX_DEG: f64 = 0.3;
/// Degrees of padding per km of straight-line distance, before clamping.
pub const BBOX_PADDING_DEG_PER_KM: f64 = 0.0005;
/// Midpoint fetch radius as a fraction of straight-line distance.
pub const MIDPOINT_RADIUS_FACTOR: f64 = 0.6;
pub const MIDPOINT_RADIUS_CAP_KM: f64 = 150.0;
pub const LOCAL_FALLBACK_RADIUS_KM: f64 = 50.0;
pub const INTERCITY_FALLBACK_RADIUS_KM: f64 = 200.0;
/// Nearest-node offsets above these log a coverage warning.
pub const LOCAL_NODE_OFFSET_WARN_KM: f64 = 10.0;
pub const INTERCITY_NODE_OFFSET_WARN_KM: f64 = 50.0;

// --- Linear segments ---

/// Accepted range for a requested segment length.
pub const MIN_SEGMENT_LENGTH_KM: f64 = 0.1;
pub const MAX_SEGMENT_LENGTH_KM: f64 = 500.0;
/// Upper bound on linear segments per map; shorter lengths are stretched to fit.
pub const MAX_LINEAR_SEGMENTS: usize = 10_000;

// --- Segment classifier ---

/// Intercity routes with more segments than this are trimmed.
pub const TRIM_MIN_SEGMENTS: usize = 10;
/// Segments kept on each side of the major-highway span.
pub const TRIM_CONTEXT_WINDOW: usize = 5;
pub const ROUTE_RATIO_MIN: f64 = 0.8;
pub const ROUTE_RATIO_MAX: f64 = 3.0;

// --- Milestones ---

/// Access routes shorter than this are treated as "on the road".
pub const MIN_ACCESS_ROUTE_KM: f64 = 0.1;
/// Straight-line distance from the road above which a POI needs a detour.
pub const DETOUR_STRAIGHT_LINE_THRESHOLD_M: f64 = 500.0;
/// POIs closer than this to the route skip junction search.
pub const JUNCTION_SEARCH_MIN_OFFSET_M: f64 = 50.0;

// --- Statistics ---

pub const MAX_STOP_RECOMMENDATIONS: usize = 5;
pub const MIN_STOP_SPACING_KM: f64 = 150.0;
/// Fuel/food milestones within this distance merge into one stop.
pub const STOP_MERGE_RADIUS_KM: f64 = 5.0;
