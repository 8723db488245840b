use super::*;
use crate::domain::{
    PrioritizedVulnerability, PrioritizedVulnerabilityQuery, VulnerabilityCounter,
};
use crate::infrastructure::{ConnectionManager, PrismaCloudApi};
use crate::plugin::ColumnValue;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

struct MockPrismaCloudApi;

#[async_trait]
impl PrismaCloudApi for MockPrismaCloudApi {
    async fn get_prioritized_vulnerability(
        &self,
        query: &PrioritizedVulnerabilityQuery,
    ) -> Result<PrioritizedVulnerability, ClientError> {
        if query.life_cycle == crate::domain::LifeCycle::Code {
            return Err(ClientError::Api(ApiError::PermissionDenied {
                message: "no dashboard access".to_string(),
            }));
        }
        Ok(PrioritizedVulnerability {
            last_updated_date_time: 1_700_000_000_000,
            total_vulnerabilities: 9,
            urgent: VulnerabilityCounter::new(2, 1),
            ..Default::default()
        })
    }
}

fn service() -> TableServiceImpl {
    let plugin = Arc::new(crate::tables::plugin().unwrap());
    let connection = Arc::new(ConnectionManager::with_client(Arc::new(MockPrismaCloudApi)));
    TableServiceImpl::new(plugin, connection)
}

fn quals(asset_type: &str, life_cycle: &str) -> HashMap<String, String> {
    HashMap::from([
        ("asset_type".to_string(), asset_type.to_string()),
        ("life_cycle".to_string(), life_cycle.to_string()),
    ])
}

#[test]
fn test_list_tables() {
    let service = service();
    let tables = service.list_tables();

    assert_eq!(service.plugin_name(), "prismacloud");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "prismacloud_prioritized_vulnerability");
    assert_eq!(tables[0].columns.len(), 14);
}

#[test]
fn test_describe_table_by_alias() {
    let schema = service()
        .describe_table("prismacloud_prioritized_vulnerabilitiy")
        .unwrap();
    assert_eq!(schema.name, "prismacloud_prioritized_vulnerability");
}

#[test]
fn test_table_name_resolves_alias() {
    let service = service();
    assert_eq!(
        service
            .table_name("prismacloud_prioritized_vulnerabilitiy")
            .unwrap(),
        "prismacloud_prioritized_vulnerability"
    );
    assert!(matches!(
        service.table_name("prismacloud_alert"),
        Err(ApplicationError::TableNotFound { .. })
    ));
}

#[test]
fn test_describe_unknown_table() {
    let err = service().describe_table("prismacloud_alert").unwrap_err();
    assert!(matches!(err, ApplicationError::TableNotFound { name } if name == "prismacloud_alert"));
}

#[tokio::test]
async fn test_query_table_returns_rows() {
    let rows = service()
        .query_table("prismacloud_prioritized_vulnerability", quals("package", "build"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("total_vulnerabilities"), Some(&ColumnValue::Int(9)));
    assert_eq!(rows[0].get("urgent_asset_count"), Some(&ColumnValue::Int(1)));
    assert_eq!(rows[0].get("patchable_asset_count"), Some(&ColumnValue::Int(0)));
}

#[tokio::test]
async fn test_query_unknown_table() {
    let err = service()
        .query_table("prismacloud_alert", HashMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "not_found");
}

#[tokio::test]
async fn test_query_table_surfaces_upstream_error() {
    let err = service()
        .query_table("prismacloud_prioritized_vulnerability", quals("iac", "code"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Table(TableError::Client(ClientError::Api(
            ApiError::PermissionDenied { .. }
        )))
    ));
    assert_eq!(err.error_type(), "upstream_permission_error");
}

#[tokio::test]
async fn test_query_table_rejects_missing_quals() {
    let err = service()
        .query_table("prismacloud_prioritized_vulnerability", HashMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), "table_error");
}
