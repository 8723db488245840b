//! Per-query state handed to hydrate functions

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::application::errors::TableError;

/// Quals for one table query plus the sink for streamed items
#[derive(Debug)]
pub struct QueryData {
    table: String,
    quals: HashMap<String, String>,
    items: mpsc::UnboundedSender<Value>,
}

impl QueryData {
    /// Create query data and the receiving end of its item stream
    pub fn new(
        table: impl Into<String>,
        quals: HashMap<String, String>,
    ) -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (items, receiver) = mpsc::unbounded_channel();
        (
            Self {
                table: table.into(),
                quals,
                items,
            },
            receiver,
        )
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Equality qual value for a column, if supplied
    pub fn qual(&self, column: &str) -> Option<&str> {
        self.quals.get(column).map(String::as_str)
    }

    /// Equality qual value for a key column declared as required
    pub fn require_qual(&self, column: &str) -> Result<&str, TableError> {
        self.qual(column)
            .ok_or_else(|| TableError::MissingRequiredQual {
                table: self.table.clone(),
                column: column.to_string(),
            })
    }

    /// Emit one item; it becomes one row once column transforms run
    pub fn stream_list_item<T: Serialize>(&self, item: &T) -> Result<(), TableError> {
        let value = serde_json::to_value(item)?;
        if self.items.send(value).is_err() {
            tracing::debug!(table = %self.table, "Item stream closed, dropping streamed item");
        }
        Ok(())
    }
}
