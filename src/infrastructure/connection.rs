//! Shared Prisma Cloud connection

use std::sync::Arc;
use tokio::sync::OnceCell;

use super::api_clients::{PrismaCloudApi, PrismaCloudClient};
use crate::application::errors::ClientError;
use crate::config::PrismaCloudConfig;

/// Lookup for `PRISMACLOUD_*` fallback settings
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds the API client on first use and hands the same instance to every hydrate call.
///
/// Construction failures are not remembered, so fixing the environment
/// and querying again is enough to recover.
pub struct ConnectionManager {
    config: PrismaCloudConfig,
    env: EnvLookup,
    client: OnceCell<Arc<dyn PrismaCloudApi>>,
}

impl ConnectionManager {
    /// Connection settings from `config`, falling back to the process environment
    pub fn new(config: PrismaCloudConfig) -> Self {
        Self::with_env(config, Arc::new(|key: &str| std::env::var(key).ok()))
    }

    pub fn with_env(config: PrismaCloudConfig, env: EnvLookup) -> Self {
        Self {
            config,
            env,
            client: OnceCell::new(),
        }
    }

    /// Use an existing client instead of building one from configuration
    pub fn with_client(client: Arc<dyn PrismaCloudApi>) -> Self {
        Self {
            config: PrismaCloudConfig::default(),
            env: Arc::new(|_: &str| None::<String>),
            client: OnceCell::from(client),
        }
    }

    pub async fn connect(&self) -> Result<Arc<dyn PrismaCloudApi>, ClientError> {
        self.client
            .get_or_try_init(|| async {
                let client =
                    PrismaCloudClient::from_config_with_env(&self.config, |key| (self.env)(key))?;
                Ok::<_, ClientError>(Arc::new(client) as Arc<dyn PrismaCloudApi>)
            })
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// Whether credentials are present in configuration or the environment
    pub fn has_credentials(&self) -> bool {
        if self.is_connected() {
            return true;
        }
        let present = |value: &Option<String>, key: &str| {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
                || (self.env)(key).is_some_and(|v| !v.trim().is_empty())
        };
        present(&self.config.url, "PRISMACLOUD_URL")
            && (present(&self.config.token, "PRISMACLOUD_TOKEN")
                || (present(&self.config.username, "PRISMACLOUD_USERNAME")
                    && present(&self.config.password, "PRISMACLOUD_PASSWORD")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AssetType, LifeCycle, PrioritizedVulnerability, PrioritizedVulnerabilityQuery,
    };
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl PrismaCloudApi for Fixed {
        async fn get_prioritized_vulnerability(
            &self,
            _query: &PrioritizedVulnerabilityQuery,
        ) -> Result<PrioritizedVulnerability, ClientError> {
            Ok(PrioritizedVulnerability {
                total_vulnerabilities: 7,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_with_client_returns_shared_instance() {
        let manager = ConnectionManager::with_client(Arc::new(Fixed));
        assert!(manager.is_connected());

        let first = manager.connect().await.unwrap();
        let second = manager.connect().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let result = first
            .get_prioritized_vulnerability(&PrioritizedVulnerabilityQuery::new(
                AssetType::Iac,
                LifeCycle::Code,
            ))
            .await
            .unwrap();
        assert_eq!(result.total_vulnerabilities, 7);
    }

    #[tokio::test]
    async fn test_connect_builds_client_from_config() {
        let manager = ConnectionManager::new(PrismaCloudConfig {
            url: Some("api.prismacloud.io".to_string()),
            token: Some("jwt".to_string()),
            timeout_seconds: 5,
            ..Default::default()
        });
        assert!(manager.has_credentials());
        assert!(!manager.is_connected());

        manager.connect().await.unwrap();
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_env_lookup_supplies_missing_settings() {
        let manager = ConnectionManager::with_env(
            PrismaCloudConfig::default(),
            Arc::new(|key: &str| match key {
                "PRISMACLOUD_URL" => Some("api.prismacloud.io".to_string()),
                "PRISMACLOUD_TOKEN" => Some("jwt".to_string()),
                _ => None,
            }),
        );
        assert!(manager.has_credentials());

        manager.connect().await.unwrap();
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_and_are_retried() {
        let manager = ConnectionManager::with_env(
            PrismaCloudConfig {
                url: Some("api.prismacloud.io".to_string()),
                ..Default::default()
            },
            Arc::new(|_: &str| None::<String>),
        );
        assert!(!manager.has_credentials());

        for _ in 0..2 {
            let err = manager.connect().await.err().unwrap();
            assert!(matches!(err, ClientError::Configuration { .. }));
        }
        assert!(!manager.is_connected());
    }
}
