//! Domain-specific error types

use thiserror::Error;

/// Domain-level errors for prioritized vulnerability lookups
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid asset type: {value}")]
    InvalidAssetType { value: String },

    #[error("Invalid life cycle: {value}")]
    InvalidLifeCycle { value: String },
}
