use axum::Router;
use linearmap::cache::{GeocodeCache, MapCache};
use linearmap::config::Config;
use linearmap::constants::{DEFAULT_GEOCODE_CACHE_MAX_ENTRIES, DEFAULT_MAP_CACHE_MAX_ENTRIES};
use linearmap::services::geocoding::NominatimGeocoder;
use linearmap::services::linear_map::LinearMapService;
use linearmap::services::overpass::{HttpOverpassTransport, OverpassClient, RetryPolicy};
use linearmap::services::poi_query::PoiQueryEngine;
use linearmap::services::rate_limiter::RateLimiter;
use linearmap::services::road_network::{OverpassRoadSource, RoadGraphBuilder};
use linearmap::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linearmap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    let pipeline = config.linear_map.clone();

    tracing::info!("Starting linear map API server");
    tracing::info!("Overpass endpoints: {}", config.overpass_endpoints.join(", "));

    // One rate limiter shared by every Overpass query in the process
    let rate_limiter = Arc::new(RateLimiter::new(Duration::from_millis(
        pipeline.min_query_interval_ms,
    )));
    let transport = Arc::new(HttpOverpassTransport::new(
        Duration::from_secs(pipeline.connect_timeout_secs),
        Duration::from_secs(pipeline.read_timeout_secs),
        &config.user_agent,
    )?);
    let overpass = OverpassClient::new(
        transport,
        config.overpass_endpoints.clone(),
        rate_limiter,
        RetryPolicy {
            max_retries: pipeline.max_retries,
            backoff_base: Duration::from_millis(pipeline.retry_backoff_base_ms),
        },
    )?;

    let geocode_cache = Arc::new(GeocodeCache::new(DEFAULT_GEOCODE_CACHE_MAX_ENTRIES));
    let geocoder = NominatimGeocoder::new(
        config.nominatim_url.clone(),
        &config.user_agent,
        Duration::from_secs(pipeline.read_timeout_secs),
        geocode_cache.clone(),
    )?;

    // Initialize services
    let graph_builder = RoadGraphBuilder::new(Arc::new(OverpassRoadSource::new(overpass.clone())));
    let poi_engine = PoiQueryEngine::new(overpass, &pipeline);
    let linear_map_service = LinearMapService::new(
        Arc::new(geocoder),
        graph_builder,
        Arc::new(poi_engine),
        pipeline,
    );

    // Create application state
    let state = Arc::new(AppState {
        linear_map_service,
        cache: Some(MapCache::new(
            config.map_cache_ttl,
            DEFAULT_MAP_CACHE_MAX_ENTRIES,
        )),
        geocode_cache: Some(geocode_cache),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", linearmap::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
