pub mod coordinates;
pub mod milestone;
pub mod poi;
pub mod road;
pub mod route;
pub mod statistics;

pub use coordinates::{Coordinates, PathProjection};
pub use milestone::{JunctionInfo, Milestone, MilestoneType, RoadSide};
pub use poi::{Poi, PoiCategory};
pub use road::{HighwayFilter, RoadSegment};
pub use route::{CoverageWarning, LinearMap, LinearMapRequest, LinearSegment, Route};
pub use statistics::{QualityMetrics, RouteStatistics, StopRecommendation};
