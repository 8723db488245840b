//! Traits for Prisma Cloud API clients

use crate::application::errors::ClientError;
use crate::domain::{PrioritizedVulnerability, PrioritizedVulnerabilityQuery};
use async_trait::async_trait;

/// Vulnerability dashboard endpoints of the Prisma Cloud API
#[async_trait]
pub trait PrismaCloudApi: Send + Sync {
    /// Fetch the prioritized vulnerability aggregate for one asset type and life cycle stage
    async fn get_prioritized_vulnerability(
        &self,
        query: &PrioritizedVulnerabilityQuery,
    ) -> Result<PrioritizedVulnerability, ClientError>;
}
