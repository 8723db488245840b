//! Table descriptors and query execution

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::column::{Column, ColumnType};
use super::hydrate::{HydrateContext, ListHydrate};
use super::query_data::QueryData;
use super::row::Row;
use crate::application::errors::TableError;

/// Whether a key column must be supplied as a qual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Require {
    Required,
    Optional,
    /// At least one of the table's `AnyOf` key columns must be supplied
    AnyOf,
}

/// How the host may reuse cached results for this key column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMatch {
    /// Only a query with the identical qual value can reuse a result
    Exact,
    /// A result for a broader query may serve a narrower one
    Subset,
}

impl Require {
    pub fn as_str(&self) -> &'static str {
        match self {
            Require::Required => "required",
            Require::Optional => "optional",
            Require::AnyOf => "any_of",
        }
    }
}

impl CacheMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMatch::Exact => "exact",
            CacheMatch::Subset => "subset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyColumn {
    pub name: String,
    pub require: Require,
    pub cache_match: CacheMatch,
}

impl KeyColumn {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            require: Require::Required,
            cache_match: CacheMatch::Subset,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            require: Require::Optional,
            cache_match: CacheMatch::Subset,
        }
    }

    pub fn any_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            require: Require::AnyOf,
            cache_match: CacheMatch::Subset,
        }
    }

    pub fn with_cache_match(mut self, cache_match: CacheMatch) -> Self {
        self.cache_match = cache_match;
        self
    }
}

/// List call configuration
#[derive(Clone)]
pub struct ListConfig {
    pub hydrate: Arc<dyn ListHydrate>,
    pub key_columns: Vec<KeyColumn>,
}

impl fmt::Debug for ListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListConfig")
            .field("key_columns", &self.key_columns)
            .finish_non_exhaustive()
    }
}

/// Table definition: list call plus output columns in order
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name (unique within the plugin)
    pub name: String,
    pub description: String,
    pub list: ListConfig,
    /// Column definitions in output order
    pub columns: Vec<Column>,
}

/// Serializable description of a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub description: String,
    pub transform: String,
}

/// Serializable description of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub description: String,
    pub key_columns: Vec<KeyColumn>,
    pub columns: Vec<ColumnSchema>,
}

impl Table {
    /// Create a table definition without columns
    pub fn new(name: impl Into<String>, description: impl Into<String>, list: ListConfig) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            list,
            columns: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column is declared as a key column
    pub fn is_key_column(&self, name: &str) -> bool {
        self.list.key_columns.iter().any(|k| k.name == name)
    }

    /// Check the descriptor is self-consistent
    pub fn validate(&self) -> Result<(), TableError> {
        let invalid = |message: String| TableError::InvalidDefinition {
            table: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("table name is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(invalid("table declares no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column {}", column.name)));
            }
        }

        let mut seen_keys = HashSet::new();
        for key in &self.list.key_columns {
            if self.get_column(&key.name).is_none() {
                return Err(invalid(format!(
                    "key column {} is not a declared column",
                    key.name
                )));
            }
            if !seen_keys.insert(key.name.as_str()) {
                return Err(invalid(format!("duplicate key column {}", key.name)));
            }
        }

        Ok(())
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            key_columns: self.list.key_columns.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnSchema {
                    name: c.name.clone(),
                    column_type: c.column_type,
                    description: c.description.clone(),
                    transform: c.transform().to_string(),
                })
                .collect(),
        }
    }

    /// Check supplied quals against the declared key columns
    pub fn check_quals(&self, quals: &HashMap<String, String>) -> Result<(), TableError> {
        for column in quals.keys() {
            if self.get_column(column).is_none() {
                return Err(TableError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
            if !self.is_key_column(column) {
                return Err(TableError::NotKeyColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }

        // Declaration order keeps the reported column deterministic
        if let Some(missing) = self
            .list
            .key_columns
            .iter()
            .find(|k| k.require == Require::Required && !quals.contains_key(&k.name))
        {
            return Err(TableError::MissingRequiredQual {
                table: self.name.clone(),
                column: missing.name.clone(),
            });
        }

        let any_of: Vec<&str> = self
            .list
            .key_columns
            .iter()
            .filter(|k| k.require == Require::AnyOf)
            .map(|k| k.name.as_str())
            .collect();
        if !any_of.is_empty() && !any_of.iter().any(|name| quals.contains_key(*name)) {
            return Err(TableError::MissingAnyOfQual {
                table: self.name.clone(),
                columns: any_of.join(", "),
            });
        }

        Ok(())
    }

    /// Run the list hydrate and turn every streamed item into a row
    pub async fn execute(
        &self,
        ctx: &HydrateContext,
        quals: HashMap<String, String>,
    ) -> Result<Vec<Row>, TableError> {
        self.check_quals(&quals)?;

        let (query_data, mut items) = QueryData::new(self.name.clone(), quals);
        self.list.hydrate.list(ctx, &query_data).await?;

        let transforms: Vec<_> = self.columns.iter().map(|c| (c, c.transform())).collect();
        let mut rows = Vec::new();
        while let Ok(item) = items.try_recv() {
            let mut row = Row::new();
            for (column, transform) in &transforms {
                let value = transform
                    .apply(&column.name, &item, &query_data)?
                    .coerce(&column.name, column.column_type)?;
                row.push(column.name.clone(), value);
            }
            rows.push(row);
        }

        tracing::debug!(table = %self.name, rows = rows.len(), "Table query completed");
        Ok(rows)
    }
}
