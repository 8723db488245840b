//! Hydrate function contract

use async_trait::async_trait;
use std::sync::Arc;

use super::query_data::QueryData;
use crate::application::errors::TableError;
use crate::infrastructure::connection::ConnectionManager;

/// Shared resources available to every hydrate call
#[derive(Clone)]
pub struct HydrateContext {
    pub connection: Arc<ConnectionManager>,
}

impl HydrateContext {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }
}

/// Populates a table by streaming items through [`QueryData::stream_list_item`].
///
/// Returning an error aborts the query; items already streamed are discarded.
#[async_trait]
pub trait ListHydrate: Send + Sync {
    async fn list(&self, ctx: &HydrateContext, d: &QueryData) -> Result<(), TableError>;
}
