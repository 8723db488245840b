//! Prisma Cloud API client implementation

use super::traits::PrismaCloudApi;
use crate::application::errors::{ApiError, ClientError};
use crate::config::PrismaCloudConfig;
use crate::domain::{PrioritizedVulnerability, PrioritizedVulnerabilityQuery, VulnerabilityCounter};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

/// Header carrying the session JWT
const AUTH_HEADER: &str = "x-redlock-auth";
/// Header in which Prisma Cloud reports request failures
const STATUS_HEADER: &str = "x-redlock-status";

const PRIORITIZED_VULNERABILITIES_PATH: &str = "/uve/api/v1/dashboard/vulnerabilities/prioritised";

const PERMISSION_HINT: &str = "the vulnerabilityDashboard feature with View permission is required (Dashboard > Vulnerability)";

/// How the client authenticates
#[derive(Clone)]
pub enum Credentials {
    /// Pre-issued JWT
    Token(String),
    /// Access key pair exchanged for a JWT through `/login`
    Login {
        username: String,
        password: String,
        customer_name: Option<String>,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***)"),
            Credentials::Login {
                username,
                customer_name,
                ..
            } => f
                .debug_struct("Login")
                .field("username", username)
                .field("customer_name", customer_name)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    message: Option<String>,
}

/// Response from the prioritized vulnerabilities endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PrioritizedVulnerabilityResponse {
    last_updated_date_time: Option<i64>,
    total_vulnerabilities: Option<i64>,
    urgent: Option<CounterResponse>,
    patchable: Option<CounterResponse>,
    exploitable: Option<CounterResponse>,
    internet_exposed: Option<CounterResponse>,
    package_in_use: Option<CounterResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CounterResponse {
    vulnerability_count: Option<i64>,
    asset_count: Option<i64>,
}

impl From<Option<CounterResponse>> for VulnerabilityCounter {
    fn from(counter: Option<CounterResponse>) -> Self {
        let counter = counter.unwrap_or_default();
        VulnerabilityCounter::new(
            counter.vulnerability_count.unwrap_or_default(),
            counter.asset_count.unwrap_or_default(),
        )
    }
}

impl From<PrioritizedVulnerabilityResponse> for PrioritizedVulnerability {
    fn from(response: PrioritizedVulnerabilityResponse) -> Self {
        PrioritizedVulnerability {
            last_updated_date_time: response.last_updated_date_time.unwrap_or_default(),
            total_vulnerabilities: response.total_vulnerabilities.unwrap_or_default(),
            urgent: response.urgent.into(),
            patchable: response.patchable.into(),
            exploitable: response.exploitable.into(),
            internet_exposed: response.internet_exposed.into(),
            package_in_use: response.package_in_use.into(),
        }
    }
}

/// Client for the Prisma Cloud CSPM API
pub struct PrismaCloudClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    /// Session JWT, obtained on first use when logging in with an access key
    token: RwLock<Option<String>>,
}

impl PrismaCloudClient {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prismacloud-tables/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let token = match &credentials {
            Credentials::Token(token) => Some(token.clone()),
            Credentials::Login { .. } => None,
        };

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            credentials,
            token: RwLock::new(token),
        })
    }

    /// Build a client from configuration, falling back to `PRISMACLOUD_*` environment variables
    pub fn from_config(config: &PrismaCloudConfig) -> Result<Self, ClientError> {
        Self::from_config_with_env(config, |key| std::env::var(key).ok())
    }

    /// Same as [`PrismaCloudClient::from_config`] with an injectable environment lookup
    pub fn from_config_with_env<F>(config: &PrismaCloudConfig, env: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |value: &Option<String>, key: &str| {
            value
                .clone()
                .or_else(|| env(key))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let url = setting(&config.url, "PRISMACLOUD_URL").ok_or_else(|| {
            ClientError::Configuration {
                message: "url must be configured (or set PRISMACLOUD_URL)".to_string(),
            }
        })?;

        let token = setting(&config.token, "PRISMACLOUD_TOKEN");
        let username = setting(&config.username, "PRISMACLOUD_USERNAME");
        let password = setting(&config.password, "PRISMACLOUD_PASSWORD");
        let customer_name = setting(&config.customer_name, "PRISMACLOUD_CUSTOMER_NAME");

        let credentials = match (token, username, password) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Login {
                username,
                password,
                customer_name,
            },
            _ => {
                return Err(ClientError::Configuration {
                    message: "either token or username and password must be configured".to_string(),
                });
            }
        };

        let timeout_seconds = if config.timeout_seconds == 0 {
            30
        } else {
            config.timeout_seconds
        };

        tracing::info!(
            base_url = %normalize_base_url(&url),
            credentials = ?credentials,
            timeout_seconds,
            "Initialized PrismaCloudClient"
        );

        Self::new(&url, credentials, Duration::from_secs(timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session JWT, logging in first if needed
    async fn auth_token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut token = self.token.write().await;
        if let Some(existing) = token.as_ref() {
            return Ok(existing.clone());
        }

        let fresh = self.login_with_credentials().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Replace a session JWT the API rejected.
    ///
    /// When another request already swapped out `stale`, its token is reused
    /// instead of logging in again.
    async fn renew_token(&self, stale: &str) -> Result<String, ClientError> {
        let mut token = self.token.write().await;
        if let Some(current) = token.as_ref().filter(|t| t.as_str() != stale) {
            return Ok(current.clone());
        }

        *token = None;
        let fresh = self.login_with_credentials().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    fn can_login(&self) -> bool {
        matches!(self.credentials, Credentials::Login { .. })
    }

    async fn login_with_credentials(&self) -> Result<String, ClientError> {
        let Credentials::Login {
            username,
            password,
            customer_name,
        } = &self.credentials
        else {
            return Err(ClientError::Configuration {
                message: "no session token available".to_string(),
            });
        };

        self.login(username, password, customer_name.as_deref())
            .await
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        customer_name: Option<&str>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/login", self.base_url);
        let payload = LoginRequest {
            username,
            password,
            customer_name,
        };

        tracing::debug!(url = %url, "Logging in to Prisma Cloud");
        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "login").await);
        }

        let login: LoginResponse = response.json().await?;
        login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::Api(ApiError::Authentication {
                    message: login
                        .message
                        .unwrap_or_else(|| "login response did not include a token".to_string()),
                })
            })
    }

    async fn fetch_prioritized_vulnerability(
        &self,
        query: &PrioritizedVulnerabilityQuery,
        token: &str,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, PRIORITIZED_VULNERABILITIES_PATH);

        tracing::debug!(
            url = %url,
            asset_type = %query.asset_type,
            life_cycle = %query.life_cycle,
            "Fetching prioritized vulnerabilities"
        );

        let response = self
            .client
            .get(&url)
            .header(AUTH_HEADER, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("asset_type", query.asset_type.as_str()),
                ("life_cycle", query.life_cycle.as_str()),
            ])
            .send()
            .await?;
        Ok(response)
    }

    /// Map a non-success response to an error
    async fn error_from_response(response: Response, operation: &str) -> ClientError {
        let status = response.status();
        let redlock_status = response
            .headers()
            .get(STATUS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let detail = redlock_status
            .filter(|s| !s.is_empty())
            .unwrap_or(body);

        let error = match status {
            StatusCode::UNAUTHORIZED => ApiError::Authentication {
                message: format!("Prisma Cloud {} rejected credentials: {}", operation, detail),
            },
            StatusCode::FORBIDDEN => ApiError::PermissionDenied {
                message: format!("Prisma Cloud {} forbidden, {}: {}", operation, PERMISSION_HINT, detail),
            },
            _ => ApiError::Http {
                status: status.as_u16(),
                message: format!("Prisma Cloud {} error: {}", operation, detail),
            },
        };
        ClientError::Api(error)
    }
}

#[async_trait]
impl PrismaCloudApi for PrismaCloudClient {
    async fn get_prioritized_vulnerability(
        &self,
        query: &PrioritizedVulnerabilityQuery,
    ) -> Result<PrioritizedVulnerability, ClientError> {
        let token = self.auth_token().await?;
        let mut response = self.fetch_prioritized_vulnerability(query, &token).await?;

        // Session JWTs expire; a key pair can log in again once
        if response.status() == StatusCode::UNAUTHORIZED && self.can_login() {
            tracing::info!("Prisma Cloud session token rejected, logging in again");
            let token = self.renew_token(&token).await?;
            response = self.fetch_prioritized_vulnerability(query, &token).await?;
        }

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "prioritized vulnerabilities").await);
        }

        let body: PrioritizedVulnerabilityResponse = response.json().await?;
        Ok(body.into())
    }
}

/// Ensure a scheme and drop trailing slashes
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
