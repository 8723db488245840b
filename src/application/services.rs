//! Application services

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use super::errors::ApplicationError;
use crate::infrastructure::ConnectionManager;
use crate::plugin::{HydrateContext, Plugin, Row, TableSchema};

/// Schema lookup and query execution for the plugin's tables
#[async_trait]
pub trait TableService: Send + Sync {
    fn plugin_name(&self) -> &str;

    fn list_tables(&self) -> Vec<TableSchema>;

    fn describe_table(&self, name: &str) -> Result<TableSchema, ApplicationError>;

    /// Registered name of a table, resolving aliases
    fn table_name(&self, name: &str) -> Result<String, ApplicationError>;

    /// Execute a table with equality quals keyed by column name
    async fn query_table(
        &self,
        name: &str,
        quals: HashMap<String, String>,
    ) -> Result<Vec<Row>, ApplicationError>;
}

pub struct TableServiceImpl {
    plugin: Arc<Plugin>,
    context: HydrateContext,
}

impl TableServiceImpl {
    pub fn new(plugin: Arc<Plugin>, connection: Arc<ConnectionManager>) -> Self {
        Self {
            plugin,
            context: HydrateContext::new(connection),
        }
    }
}

#[async_trait]
impl TableService for TableServiceImpl {
    fn plugin_name(&self) -> &str {
        self.plugin.name()
    }

    fn list_tables(&self) -> Vec<TableSchema> {
        self.plugin.tables().map(|t| t.schema()).collect()
    }

    fn describe_table(&self, name: &str) -> Result<TableSchema, ApplicationError> {
        self.plugin
            .get_table(name)
            .map(|t| t.schema())
            .ok_or_else(|| ApplicationError::TableNotFound {
                name: name.to_string(),
            })
    }

    fn table_name(&self, name: &str) -> Result<String, ApplicationError> {
        self.plugin
            .get_table(name)
            .map(|t| t.name.clone())
            .ok_or_else(|| ApplicationError::TableNotFound {
                name: name.to_string(),
            })
    }

    async fn query_table(
        &self,
        name: &str,
        quals: HashMap<String, String>,
    ) -> Result<Vec<Row>, ApplicationError> {
        let table = self
            .plugin
            .get_table(name)
            .ok_or_else(|| ApplicationError::TableNotFound {
                name: name.to_string(),
            })?;

        let start = Instant::now();
        tracing::info!(table = %table.name, quals = ?quals, "Executing table query");

        let span = tracing::info_span!(
            "table_query",
            plugin = %self.plugin.name(),
            table = %table.name
        );
        match table.execute(&self.context, quals).instrument(span).await {
            Ok(rows) => {
                tracing::info!(
                    table = %table.name,
                    rows = rows.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Table query succeeded"
                );
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!(table = %table.name, error = %e, "Table query failed");
                Err(e.into())
            }
        }
    }
}
