//! Application layer error types

use crate::domain::DomainError;
use crate::plugin::ColumnType;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Table not found: {name}")]
    TableNotFound { name: String },
}

/// Errors raised while validating or executing a table query
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table {table} requires a qual on column {column}")]
    MissingRequiredQual { table: String, column: String },

    #[error("Table {table} requires a qual on at least one of: {columns}")]
    MissingAnyOfQual { table: String, columns: String },

    #[error("Table {table} has no column {column}")]
    UnknownColumn { table: String, column: String },

    #[error("Column {column} of table {table} is not a key column")]
    NotKeyColumn { table: String, column: String },

    #[error("Column {column} expects {expected} but the transform produced {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: String,
    },

    #[error("Invalid table definition for {table}: {message}")]
    InvalidDefinition { table: String, message: String },

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the Prisma Cloud API client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Connection configuration error: {message}")]
    Configuration { message: String },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },
}

impl ApplicationError {
    /// Get the error type as a string for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ApplicationError::Table(TableError::Client(client)) => client.error_type(),
            ApplicationError::Table(TableError::Domain(_)) => "domain_error",
            ApplicationError::Table(_) => "table_error",
            ApplicationError::TableNotFound { .. } => "not_found",
        }
    }
}

impl ClientError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::Configuration { .. } => "connection_not_configured",
            ClientError::Api(ApiError::Authentication { .. }) => "upstream_authentication_error",
            ClientError::Api(ApiError::PermissionDenied { .. }) => "upstream_permission_error",
            _ => "upstream_error",
        }
    }
}
