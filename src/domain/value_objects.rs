//! Domain value objects representing immutable concepts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

/// Kind of asset the vulnerability dashboard aggregates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetType {
    Iac,
    Package,
    DeployedImage,
    ServerlessFunction,
    Host,
    RegistryImage,
    VmImage,
}

impl AssetType {
    pub const ALL: [AssetType; 7] = [
        AssetType::Iac,
        AssetType::Package,
        AssetType::DeployedImage,
        AssetType::ServerlessFunction,
        AssetType::Host,
        AssetType::RegistryImage,
        AssetType::VmImage,
    ];

    /// Value sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Iac => "iac",
            AssetType::Package => "package",
            AssetType::DeployedImage => "deployedImage",
            AssetType::ServerlessFunction => "serverlessFunction",
            AssetType::Host => "host",
            AssetType::RegistryImage => "registryImage",
            AssetType::VmImage => "vmImage",
        }
    }
}

impl FromStr for AssetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AssetType::ALL
            .into_iter()
            .find(|asset_type| asset_type.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::InvalidAssetType {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of the application life cycle an asset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeCycle {
    Code,
    Build,
    Deploy,
    Run,
}

impl LifeCycle {
    pub const ALL: [LifeCycle; 4] = [
        LifeCycle::Code,
        LifeCycle::Build,
        LifeCycle::Deploy,
        LifeCycle::Run,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifeCycle::Code => "code",
            LifeCycle::Build => "build",
            LifeCycle::Deploy => "deploy",
            LifeCycle::Run => "run",
        }
    }
}

impl FromStr for LifeCycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LifeCycle::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::InvalidLifeCycle {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for LifeCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
