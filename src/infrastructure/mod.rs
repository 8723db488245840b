//! Infrastructure Layer - External service integrations
//!
//! This module contains the Prisma Cloud API client and the connection
//! shared by table hydrate functions.

pub mod api_clients;
pub mod connection;

pub use api_clients::*;
pub use connection::*;
