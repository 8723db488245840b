//! Route definitions and server setup

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware,
    routing::get,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::Config;
use crate::logging::SERVICE_NAME;
use crate::presentation::{
    controllers::{
        AppState,
        health::{detailed_health_check, health_check, liveness_probe},
        tables::{get_table, list_tables, query_table},
    },
    middleware::logging_middleware,
    models::*,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::tables::list_tables,
        crate::presentation::controllers::tables::get_table,
        crate::presentation::controllers::tables::query_table,
        crate::presentation::controllers::health::health_check,
        crate::presentation::controllers::health::detailed_health_check,
        crate::presentation::controllers::health::liveness_probe
    ),
    components(
        schemas(
            TableListResponse,
            TableSummaryDto,
            TableSchemaResponse,
            KeyColumnDto,
            ColumnDto,
            TableRowsResponse,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "tables", description = "Table schemas and row queries"),
        (name = "health", description = "Service health endpoints")
    ),
    info(
        title = "Prisma Cloud Tables API",
        version = "0.1.0",
        description = "Prisma Cloud vulnerability dashboard data exposed as queryable tables."
    )
)]
pub struct ApiDoc;

/// Create the application router with middleware stack
pub fn create_router(app_state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/{name}", get(get_table))
        .route("/tables/{name}/rows", get(query_table));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .route("/health/live", get(liveness_probe));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes);

    if config.server.enable_docs {
        router = router
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(
                    |request: &Request<Body>| {
                        tracing::info_span!(
                            "http_request",
                            service = SERVICE_NAME,
                            method = %request.method(),
                            uri = %request.uri()
                        )
                    },
                ))
                .layer(cors_layer(&config.server.allowed_origins))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
                )))
                .layer(middleware::from_fn(logging_middleware)),
        )
        .with_state(app_state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
