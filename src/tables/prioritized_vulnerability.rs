//! `prismacloud_prioritized_vulnerability` table
//!
//! Reading this endpoint requires the vulnerabilityDashboard feature with View
//! permission in the caller's permission group (Dashboard > Vulnerability in
//! the console).

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::TableError;
use crate::domain::{AssetType, LifeCycle, PrioritizedVulnerabilityQuery};
use crate::plugin::{
    CacheMatch, Column, ColumnType, HydrateContext, KeyColumn, ListConfig, ListHydrate, QueryData,
    Table, Transform,
};

pub const TABLE_NAME: &str = "prismacloud_prioritized_vulnerability";
/// Name the table was first published under
pub const LEGACY_TABLE_NAME: &str = "prismacloud_prioritized_vulnerabilitiy";

/// `(bucket, counter, description)` for every flattened counter column
const COUNTER_COLUMNS: [(&str, &str, &str); 10] = [
    ("urgent", "vulnerability_count", "The number of urgent vulnerabilities."),
    ("urgent", "asset_count", "The number of assets with urgent vulnerabilities."),
    ("patchable", "vulnerability_count", "The number of patchable vulnerabilities."),
    ("patchable", "asset_count", "The number of assets with patchable vulnerabilities."),
    ("exploitable", "vulnerability_count", "The number of exploitable vulnerabilities."),
    ("exploitable", "asset_count", "The number of assets with exploitable vulnerabilities."),
    (
        "internet_exposed",
        "vulnerability_count",
        "The number of internet-exposed vulnerabilities.",
    ),
    (
        "internet_exposed",
        "asset_count",
        "The number of assets with internet-exposed vulnerabilities.",
    ),
    (
        "package_in_use",
        "vulnerability_count",
        "The number of vulnerabilities in packages currently in use.",
    ),
    (
        "package_in_use",
        "asset_count",
        "The number of assets with vulnerabilities in packages currently in use.",
    ),
];

pub fn table() -> Table {
    let table = Table::new(
        TABLE_NAME,
        "Returns the top-priority vulnerabilities which are aggregated based on the most urgent, exploitable, patchable, and vulnerable packages in use along with the number of assets they occur in.",
        ListConfig {
            hydrate: Arc::new(ListPrioritizedVulnerabilities),
            key_columns: vec![
                KeyColumn::required("asset_type").with_cache_match(CacheMatch::Exact),
                KeyColumn::required("life_cycle").with_cache_match(CacheMatch::Exact),
            ],
        },
    )
    .add_column(
        Column::new(
            "asset_type",
            ColumnType::String,
            "The type of asset. Possible values are: iac, package, deployedImage, serverlessFunction, host, registryImage, vmImage.",
        )
        .with_transform(Transform::from_qual("asset_type")),
    )
    .add_column(
        Column::new(
            "life_cycle",
            ColumnType::String,
            "The life cycle stage of the asset. Possible values are: code, build, deploy, run.",
        )
        .with_transform(Transform::from_qual("life_cycle")),
    )
    .add_column(
        Column::new(
            "last_updated_date_time",
            ColumnType::Timestamp,
            "The timestamp when the data was last updated.",
        )
        .with_transform(
            Transform::from_field("last_updated_date_time")
                .null_if_zero_value()
                .unix_ms_to_timestamp(),
        ),
    )
    .add_column(Column::new(
        "total_vulnerabilities",
        ColumnType::Int,
        "The total number of vulnerabilities.",
    ));

    COUNTER_COLUMNS
        .iter()
        .fold(table, |table, (bucket, counter, description)| {
            table.add_column(counter_column(bucket, counter, description))
        })
}

/// `<bucket>_<counter>` column read from `<bucket>.<counter>`
fn counter_column(bucket: &str, counter: &str, description: &str) -> Column {
    Column::new(format!("{}_{}", bucket, counter), ColumnType::Int, description)
        .with_transform(Transform::from_field(format!("{}.{}", bucket, counter)))
}

/// Lookup parameters from the `asset_type` and `life_cycle` quals
pub fn build_query(d: &QueryData) -> Result<PrioritizedVulnerabilityQuery, TableError> {
    let asset_type: AssetType = d.require_qual("asset_type")?.parse()?;
    let life_cycle: LifeCycle = d.require_qual("life_cycle")?.parse()?;
    Ok(PrioritizedVulnerabilityQuery::new(asset_type, life_cycle))
}

struct ListPrioritizedVulnerabilities;

#[async_trait]
impl ListHydrate for ListPrioritizedVulnerabilities {
    async fn list(&self, ctx: &HydrateContext, d: &QueryData) -> Result<(), TableError> {
        let api = ctx.connection.connect().await.map_err(|e| {
            tracing::error!(table = %d.table(), error = %e, "connection_error");
            e
        })?;

        let query = build_query(d)?;
        tracing::debug!(
            table = %d.table(),
            asset_type = %query.asset_type,
            life_cycle = %query.life_cycle,
            "Listing prioritized vulnerabilities"
        );

        let vulnerability = api.get_prioritized_vulnerability(&query).await.map_err(|e| {
            tracing::error!(table = %d.table(), error = %e, "api_error");
            e
        })?;

        d.stream_list_item(&vulnerability)
    }
}
