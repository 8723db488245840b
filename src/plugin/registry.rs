//! Plugin table registry

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::table::Table;
use crate::application::errors::TableError;

/// A named set of tables served together
#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
    tables: BTreeMap<String, Arc<Table>>,
    aliases: HashMap<String, String>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a table after validating its definition
    pub fn register_table(&mut self, table: Table) -> Result<(), TableError> {
        table.validate()?;
        if self.tables.contains_key(&table.name) || self.aliases.contains_key(&table.name) {
            return Err(TableError::InvalidDefinition {
                table: table.name,
                message: "table is already registered".to_string(),
            });
        }
        self.tables.insert(table.name.clone(), Arc::new(table));
        Ok(())
    }

    /// Make `alias` resolve to an already registered table
    pub fn register_alias(
        &mut self,
        alias: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<(), TableError> {
        let alias = alias.into();
        let table = table.into();
        if !self.tables.contains_key(&table) {
            return Err(TableError::InvalidDefinition {
                table,
                message: format!("alias {} targets an unregistered table", alias),
            });
        }
        if self.tables.contains_key(&alias) {
            return Err(TableError::InvalidDefinition {
                table,
                message: format!("alias {} shadows a registered table", alias),
            });
        }
        self.aliases.insert(alias, table);
        Ok(())
    }

    /// Get a table by name or alias
    pub fn get_table(&self, name: &str) -> Option<Arc<Table>> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.tables.get(name).cloned()
    }

    /// Registered table names, sorted; aliases are not listed
    pub fn list_table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }
}
