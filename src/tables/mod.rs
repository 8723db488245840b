//! Prisma Cloud tables

pub mod prioritized_vulnerability;

use crate::application::errors::TableError;
use crate::plugin::Plugin;

pub const PLUGIN_NAME: &str = "prismacloud";

/// The plugin with every Prisma Cloud table registered
pub fn plugin() -> Result<Plugin, TableError> {
    let mut plugin = Plugin::new(PLUGIN_NAME);
    plugin.register_table(prioritized_vulnerability::table())?;
    plugin.register_alias(
        prioritized_vulnerability::LEGACY_TABLE_NAME,
        prioritized_vulnerability::TABLE_NAME,
    )?;
    Ok(plugin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_registers_tables() {
        let plugin = plugin().unwrap();
        assert_eq!(plugin.name(), "prismacloud");
        assert_eq!(
            plugin.list_table_names(),
            vec!["prismacloud_prioritized_vulnerability"]
        );
        assert_eq!(
            plugin
                .get_table("prismacloud_prioritized_vulnerabilitiy")
                .unwrap()
                .name,
            "prismacloud_prioritized_vulnerability"
        );
    }
}
