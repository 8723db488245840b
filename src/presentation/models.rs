//! API request and response models

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::plugin::{KeyColumn, Row, TableSchema};

/// Summary of a table served by the plugin
#[derive(Serialize, ToSchema)]
pub struct TableSummaryDto {
    /// Table name
    #[schema(example = "prismacloud_prioritized_vulnerability")]
    pub name: String,

    pub description: String,

    /// Columns the query must or may constrain
    #[schema(example = json!(["asset_type", "life_cycle"]))]
    pub key_columns: Vec<String>,
}

/// Response model for the table listing
#[derive(Serialize, ToSchema)]
pub struct TableListResponse {
    #[schema(example = "prismacloud")]
    pub plugin: String,
    pub tables: Vec<TableSummaryDto>,
}

/// DTO for a key column declaration
#[derive(Serialize, ToSchema)]
pub struct KeyColumnDto {
    #[schema(example = "asset_type")]
    pub name: String,

    /// required, optional or any_of
    #[schema(example = "required")]
    pub require: String,

    /// exact or subset
    #[schema(example = "exact")]
    pub cache_match: String,
}

/// DTO for a column definition
#[derive(Serialize, ToSchema)]
pub struct ColumnDto {
    #[schema(example = "urgent_vulnerability_count")]
    pub name: String,

    #[serde(rename = "type")]
    #[schema(example = "int")]
    pub column_type: String,

    pub description: String,

    /// How the value is derived from the hydrated item
    #[schema(example = "from_field(urgent.vulnerability_count)")]
    pub transform: String,
}

/// Response model for a table schema
#[derive(Serialize, ToSchema)]
pub struct TableSchemaResponse {
    pub name: String,
    pub description: String,
    pub key_columns: Vec<KeyColumnDto>,
    pub columns: Vec<ColumnDto>,
}

/// Response model for a table query
#[derive(Serialize, ToSchema)]
pub struct TableRowsResponse {
    #[schema(example = "prismacloud_prioritized_vulnerability")]
    pub table: String,

    #[schema(example = 1)]
    pub row_count: usize,

    /// Rows as objects keyed by column name, in column order
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
}

/// Error response model
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "MISSING_QUAL")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "Table prismacloud_prioritized_vulnerability requires a qual on column asset_type")]
    pub message: String,

    /// Additional error details
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// Request identifier for tracing
    pub request_id: Uuid,

    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,

    #[schema(example = "0.1.0")]
    pub version: String,

    pub timestamp: DateTime<Utc>,

    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl From<&KeyColumn> for KeyColumnDto {
    fn from(key: &KeyColumn) -> Self {
        Self {
            name: key.name.clone(),
            require: key.require.as_str().to_string(),
            cache_match: key.cache_match.as_str().to_string(),
        }
    }
}

impl From<&TableSchema> for TableSummaryDto {
    fn from(schema: &TableSchema) -> Self {
        Self {
            name: schema.name.clone(),
            description: schema.description.clone(),
            key_columns: schema.key_columns.iter().map(|k| k.name.clone()).collect(),
        }
    }
}

impl From<TableSchema> for TableSchemaResponse {
    fn from(schema: TableSchema) -> Self {
        Self {
            key_columns: schema.key_columns.iter().map(KeyColumnDto::from).collect(),
            columns: schema
                .columns
                .into_iter()
                .map(|c| ColumnDto {
                    name: c.name,
                    column_type: c.column_type.to_string(),
                    description: c.description,
                    transform: c.transform,
                })
                .collect(),
            name: schema.name,
            description: schema.description,
        }
    }
}
