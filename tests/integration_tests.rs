//! End-to-end tests: HTTP surface -> table -> Prisma Cloud client against a mocked API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockito::{Matcher, Server, ServerGuard};
use prismacloud_tables::{
    Config,
    application::{TableService, TableServiceImpl},
    config::PrismaCloudConfig,
    infrastructure::ConnectionManager,
    plugin::ColumnValue,
    presentation::{AppState, create_router},
    tables,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

const PRIORITISED_PATH: &str = "/uve/api/v1/dashboard/vulnerabilities/prioritised";

fn prisma_config(server: &ServerGuard) -> PrismaCloudConfig {
    PrismaCloudConfig {
        url: Some(server.url()),
        username: Some("access-key".to_string()),
        password: Some("secret-key".to_string()),
        customer_name: None,
        token: None,
        timeout_seconds: 5,
    }
}

fn service(config: PrismaCloudConfig) -> (TableServiceImpl, Arc<ConnectionManager>) {
    let plugin = Arc::new(tables::plugin().unwrap());
    let connection = Arc::new(ConnectionManager::with_env(
        config,
        Arc::new(|_: &str| None::<String>),
    ));
    (
        TableServiceImpl::new(plugin, connection.clone()),
        connection,
    )
}

fn quals(asset_type: &str, life_cycle: &str) -> HashMap<String, String> {
    HashMap::from([
        ("asset_type".to_string(), asset_type.to_string()),
        ("life_cycle".to_string(), life_cycle.to_string()),
    ])
}

async fn mock_login(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/login")
        .match_body(Matcher::PartialJson(json!({
            "username": "access-key",
            "password": "secret-key"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "session-jwt", "message": "login_successful"}).to_string())
        .create_async()
        .await
}

async fn mock_dashboard(
    server: &mut ServerGuard,
    asset_type: &str,
    life_cycle: &str,
    body: Value,
) -> mockito::Mock {
    server
        .mock("GET", PRIORITISED_PATH)
        .match_header("x-redlock-auth", "session-jwt")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("asset_type".into(), asset_type.into()),
            Matcher::UrlEncoded("life_cycle".into(), life_cycle.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_query_table_against_mocked_prisma_cloud() {
    let mut server = Server::new_async().await;
    let login = mock_login(&mut server).await;
    let dashboard = mock_dashboard(
        &mut server,
        "serverlessFunction",
        "deploy",
        json!({
            "lastUpdatedDateTime": 1714521600000i64,
            "totalVulnerabilities": 57,
            "urgent": {"vulnerabilityCount": 3, "assetCount": 2},
            "patchable": {"vulnerabilityCount": 30, "assetCount": 9},
            "exploitable": {"vulnerabilityCount": 6, "assetCount": 4},
            "internetExposed": {"vulnerabilityCount": 1, "assetCount": 1},
            "packageInUse": {"vulnerabilityCount": 12, "assetCount": 5}
        }),
    )
    .await;

    let (service, connection) = service(prisma_config(&server));
    let rows = service
        .query_table(
            "prismacloud_prioritized_vulnerability",
            quals("serverlessFunction", "deploy"),
        )
        .await
        .unwrap();

    login.assert_async().await;
    dashboard.assert_async().await;
    assert!(connection.is_connected());

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(
        row.get("asset_type"),
        Some(&ColumnValue::String("serverlessFunction".to_string()))
    );
    assert_eq!(row.get("total_vulnerabilities"), Some(&ColumnValue::Int(57)));
    assert_eq!(row.get("patchable_vulnerability_count"), Some(&ColumnValue::Int(30)));
    assert_eq!(row.get("internet_exposed_asset_count"), Some(&ColumnValue::Int(1)));
    assert_eq!(row.get("package_in_use_asset_count"), Some(&ColumnValue::Int(5)));
    match row.get("last_updated_date_time") {
        Some(ColumnValue::Timestamp(ts)) => assert_eq!(ts.timestamp_millis(), 1_714_521_600_000),
        other => panic!("Expected timestamp, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_happens_once_across_queries() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "session-jwt"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let _host = mock_dashboard(&mut server, "host", "run", json!({"totalVulnerabilities": 1})).await;
    let _iac = mock_dashboard(&mut server, "iac", "code", json!({"totalVulnerabilities": 2})).await;

    let (service, _connection) = service(prisma_config(&server));
    let host = service
        .query_table("prismacloud_prioritized_vulnerability", quals("host", "run"))
        .await
        .unwrap();
    let iac = service
        .query_table("prismacloud_prioritized_vulnerabilitiy", quals("iac", "code"))
        .await
        .unwrap();

    login.assert_async().await;
    assert_eq!(host[0].get("total_vulnerabilities"), Some(&ColumnValue::Int(1)));
    assert_eq!(iac[0].get("total_vulnerabilities"), Some(&ColumnValue::Int(2)));
    assert_eq!(iac[0].get("last_updated_date_time"), Some(&ColumnValue::Null));
}

#[tokio::test]
async fn test_http_rows_endpoint_end_to_end() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let _dashboard = mock_dashboard(
        &mut server,
        "vmImage",
        "build",
        json!({
            "lastUpdatedDateTime": 0,
            "totalVulnerabilities": 4,
            "urgent": {"vulnerabilityCount": 4, "assetCount": 1}
        }),
    )
    .await;

    let (service, connection) = service(prisma_config(&server));
    let app = create_router(
        AppState {
            table_service: Arc::new(service),
            connection,
        },
        &Config::default(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tables/prismacloud_prioritized_vulnerability/rows?asset_type=vmImage&life_cycle=build")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["table"], "prismacloud_prioritized_vulnerability");
    let row = &body["rows"][0];
    assert_eq!(row["last_updated_date_time"], Value::Null);
    assert_eq!(row["urgent_vulnerability_count"], 4);
    assert_eq!(row["patchable_vulnerability_count"], 0);
    let columns: Vec<&String> = row.as_object().unwrap().keys().collect();
    assert_eq!(columns.len(), 14);
}

#[tokio::test]
async fn test_upstream_failure_maps_to_bad_gateway() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let _dashboard = server
        .mock("GET", PRIORITISED_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let (service, connection) = service(prisma_config(&server));
    let app = create_router(
        AppState {
            table_service: Arc::new(service),
            connection,
        },
        &Config::default(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tables/prismacloud_prioritized_vulnerability/rows?asset_type=host&life_cycle=run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(body["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_upstream_error() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/login")
        .with_status(401)
        .create_async()
        .await;

    let (service, connection) = service(prisma_config(&server));
    let err = service
        .query_table("prismacloud_prioritized_vulnerability", quals("host", "run"))
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "upstream_authentication_error");
    // The client is built; only the session login failed
    assert!(connection.is_connected());
}
