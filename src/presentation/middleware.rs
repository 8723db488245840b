//! HTTP middleware for the web server

use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;

use crate::application::errors::{ApplicationError, ClientError, TableError};
use crate::presentation::models::ErrorResponse;

impl ApplicationError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApplicationError::TableNotFound { .. } => (StatusCode::NOT_FOUND, "TABLE_NOT_FOUND"),
            ApplicationError::Table(TableError::Domain(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_QUAL_VALUE")
            }
            ApplicationError::Table(
                TableError::MissingRequiredQual { .. } | TableError::MissingAnyOfQual { .. },
            ) => (StatusCode::BAD_REQUEST, "MISSING_QUAL"),
            ApplicationError::Table(
                TableError::UnknownColumn { .. } | TableError::NotKeyColumn { .. },
            ) => (StatusCode::BAD_REQUEST, "INVALID_QUAL"),
            ApplicationError::Table(TableError::Client(ClientError::Configuration { .. })) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CONNECTION_NOT_CONFIGURED")
            }
            ApplicationError::Table(TableError::Client(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            ApplicationError::Table(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TABLE_ERROR"),
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let error_response = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
            details: Some(serde_json::json!({ "type": self.error_type() })),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };

        if status.is_server_error() {
            tracing::error!(
                request_id = %error_response.request_id,
                status = %status,
                error = %self,
                "Request failed"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// Request logging middleware with timing and request ID
pub async fn logging_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Processing request"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}
