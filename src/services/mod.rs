pub mod geocoding;
pub mod geometry;
pub mod junction;
pub mod linear_map;
pub mod milestone_factory;
pub mod overpass;
pub mod path_extractor;
pub mod poi_quality;
pub mod poi_query;
pub mod rate_limiter;
pub mod road_graph;
pub mod road_network;
pub mod route_segmentation;
pub mod route_statistics;
pub mod segment_classifier;
