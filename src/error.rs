use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Geocoding failed: {0}")]
    Geocode(String),

    #[error("No road network available: {0}")]
    NoRoadNetwork(String),

    #[error("No route found: {0}")]
    NoRouteFound(String),

    #[error("Spatial query failed: {0}")]
    SpatialQuery(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Geocode(ref e) => {
                tracing::info!("Geocoding failed: {}", e);
                (StatusCode::BAD_REQUEST, e.as_str())
            }
            AppError::NoRoadNetwork(ref e) => {
                tracing::warn!("No road network: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.as_str())
            }
            AppError::NoRouteFound(ref e) => {
                tracing::warn!("No route found: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.as_str())
            }
            AppError::SpatialQuery(ref e) => {
                tracing::error!("Spatial query error: {}", e);
                (StatusCode::BAD_GATEWAY, "Spatial query service error")
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = AppError::NoRoadNetwork("all 4 fetch strategies returned 0 nodes".to_string());
        assert!(err.to_string().starts_with("No road network available"));

        let err = AppError::Geocode("Atlantis".to_string());
        assert_eq!(err.to_string(), "Geocoding failed: Atlantis");
    }

    #[test]
    fn test_status_codes() {
        let response = AppError::NoRouteFound("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::SpatialQuery("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = AppError::InvalidRequest("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
