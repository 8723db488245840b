//! Application Layer - Use cases and application services
//!
//! This module coordinates table lookups and query execution between the
//! presentation layer and the table plugin.

pub mod errors;
pub mod services;

#[cfg(test)]
mod tests;

pub use errors::*;
pub use services::*;
