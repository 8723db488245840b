//! Table controller: schemas and row queries

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use std::collections::HashMap;

use super::AppState;
use crate::application::errors::ApplicationError;
use crate::presentation::models::{
    ErrorResponse, TableListResponse, TableRowsResponse, TableSchemaResponse, TableSummaryDto,
};

/// List the tables served by the plugin
#[utoipa::path(
    get,
    path = "/api/v1/tables",
    tag = "tables",
    responses(
        (status = 200, description = "Tables served by the plugin", body = TableListResponse)
    )
)]
pub async fn list_tables(State(app_state): State<AppState>) -> Json<TableListResponse> {
    let tables = app_state
        .table_service
        .list_tables()
        .iter()
        .map(TableSummaryDto::from)
        .collect();

    Json(TableListResponse {
        plugin: app_state.table_service.plugin_name().to_string(),
        tables,
    })
}

/// Describe a table's columns and key columns
#[utoipa::path(
    get,
    path = "/api/v1/tables/{name}",
    tag = "tables",
    params(
        ("name" = String, Path, description = "Table name or alias")
    ),
    responses(
        (status = 200, description = "Table schema", body = TableSchemaResponse),
        (status = 404, description = "Unknown table", body = ErrorResponse)
    )
)]
pub async fn get_table(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TableSchemaResponse>, ApplicationError> {
    let schema = app_state.table_service.describe_table(&name)?;
    Ok(Json(schema.into()))
}

/// Query a table; every query parameter is an equality qual on a key column
#[utoipa::path(
    get,
    path = "/api/v1/tables/{name}/rows",
    tag = "tables",
    params(
        ("name" = String, Path, description = "Table name or alias"),
        ("asset_type" = Option<String>, Query, description = "Key column of prismacloud_prioritized_vulnerability: iac, package, deployedImage, serverlessFunction, host, registryImage, vmImage"),
        ("life_cycle" = Option<String>, Query, description = "Key column of prismacloud_prioritized_vulnerability: code, build, deploy, run")
    ),
    responses(
        (status = 200, description = "Rows produced by the table", body = TableRowsResponse),
        (status = 400, description = "Missing or invalid quals", body = ErrorResponse),
        (status = 404, description = "Unknown table", body = ErrorResponse),
        (status = 502, description = "Prisma Cloud request failed", body = ErrorResponse),
        (status = 503, description = "Prisma Cloud connection not configured", body = ErrorResponse)
    )
)]
pub async fn query_table(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    Query(quals): Query<HashMap<String, String>>,
) -> Result<Json<TableRowsResponse>, ApplicationError> {
    let table = app_state.table_service.table_name(&name)?;
    let rows = app_state.table_service.query_table(&table, quals).await?;

    Ok(Json(TableRowsResponse {
        table,
        row_count: rows.len(),
        rows,
    }))
}
