//! Presentation Layer - Web API and HTTP handling
//!
//! This module contains the Axum web server setup through which hosts read
//! table schemas and query rows.

pub mod controllers;
pub mod middleware;
pub mod models;
pub mod routes;


pub use controllers::*;
pub use middleware::*;
pub use models::*;
pub use routes::*;
