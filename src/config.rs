//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub prismacloud: PrismaCloudConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose interactive API docs (Swagger UI).
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any. Empty vector -> no external origins.
    pub allowed_origins: Vec<String>,
}

/// Prisma Cloud connection settings.
///
/// Either `token` or `username` + `password` must be available, here or via
/// the `PRISMACLOUD_*` environment variables, before the first table query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrismaCloudConfig {
    /// API endpoint, e.g. `api.prismacloud.io`. The scheme is optional.
    pub url: Option<String>,
    /// Access key ID
    pub username: Option<String>,
    /// Secret key
    pub password: Option<String>,
    pub customer_name: Option<String>,
    /// Pre-issued JWT; skips the login exchange when present.
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                enable_docs: true,
                request_timeout_seconds: 30,
                allowed_origins: vec!["*".to_string()],
            },
            prismacloud: PrismaCloudConfig {
                timeout_seconds: 30,
                ..PrismaCloudConfig::default()
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from defaults, files and environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // Override with environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix("PRISMACLOUD_TABLES").separator("__"))
            .build()?
            .try_deserialize()
    }
}
