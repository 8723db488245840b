//! Health check controller

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::json;

use crate::presentation::controllers::AppState;
use crate::presentation::models::HealthResponse;

/// Basic health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        details: None,
    })
}

/// Detailed health check including Prisma Cloud connection readiness
#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "health",
    responses(
        (status = 200, description = "Detailed health information", body = HealthResponse),
        (status = 503, description = "Prisma Cloud credentials are missing", body = HealthResponse)
    )
)]
pub async fn detailed_health_check(
    State(app_state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let credentials_configured = app_state.connection.has_credentials();
    let overall_status = if credentials_configured {
        "healthy"
    } else {
        "degraded"
    };

    let tables: Vec<String> = app_state
        .table_service
        .list_tables()
        .into_iter()
        .map(|t| t.name)
        .collect();

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        details: Some(json!({
            "plugin": app_state.table_service.plugin_name(),
            "tables": tables,
            "prismacloud": {
                "credentials_configured": credentials_configured,
                "connected": app_state.connection.is_connected()
            },
            "build_info": {
                "version": env!("CARGO_PKG_VERSION"),
                "build_date": option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
                "git_sha": option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
            }
        })),
    };

    if credentials_configured {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe endpoint
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive")
    )
)]
pub async fn liveness_probe() -> StatusCode {
    StatusCode::OK
}
