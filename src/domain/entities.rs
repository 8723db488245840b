//! Domain entities for the vulnerability dashboard

use serde::{Deserialize, Serialize};

use super::value_objects::{AssetType, LifeCycle};

/// Parameters of a prioritized vulnerability lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrioritizedVulnerabilityQuery {
    pub asset_type: AssetType,
    pub life_cycle: LifeCycle,
}

impl PrioritizedVulnerabilityQuery {
    pub fn new(asset_type: AssetType, life_cycle: LifeCycle) -> Self {
        Self {
            asset_type,
            life_cycle,
        }
    }
}

/// Vulnerability and affected asset counts for one priority bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityCounter {
    pub vulnerability_count: i64,
    pub asset_count: i64,
}

impl VulnerabilityCounter {
    pub fn new(vulnerability_count: i64, asset_count: i64) -> Self {
        Self {
            vulnerability_count,
            asset_count,
        }
    }
}

/// Aggregate of the top-priority vulnerabilities for one asset type and life cycle stage.
///
/// Serializes with snake_case keys; table transforms address nested
/// counters by path, e.g. `urgent.vulnerability_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedVulnerability {
    /// Epoch milliseconds; zero when the dashboard has not been computed yet
    pub last_updated_date_time: i64,
    pub total_vulnerabilities: i64,
    pub urgent: VulnerabilityCounter,
    pub patchable: VulnerabilityCounter,
    pub exploitable: VulnerabilityCounter,
    pub internet_exposed: VulnerabilityCounter,
    pub package_in_use: VulnerabilityCounter,
}
