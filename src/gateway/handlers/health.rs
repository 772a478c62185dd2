//! Health check handler

use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Storage backend in use
    #[schema(example = "postgres")]
    pub store: String,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: String,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

/// Health check endpoint
///
/// Pings the store. Does NOT expose any failure details in the response.
///
/// - Healthy: 200 OK + {code: 0, data: {...}}
/// - Unhealthy: 503 Service Unavailable + {code: 5001, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse,
            content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    if let Err(e) = state.store.health_check().await {
        tracing::error!(store = state.store.name(), "[HEALTH] store ping failed: {}", e);
        return ApiError::service_unavailable("unavailable").into_err();
    }

    ok(HealthResponse {
        store: state.store.name().to_string(),
        version: env!("GIT_HASH").to_string(),
        timestamp_ms: Utc::now().timestamp_millis(),
    })
}
