//! Prisma Cloud Tables - Prisma Cloud vulnerability dashboard data as queryable tables
//!
//! Each table is a declarative descriptor (typed columns plus transforms) with
//! a hydrate function that calls the Prisma Cloud API and streams items, laid
//! out in a Domain-Driven Design (DDD) architecture.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod plugin;
pub mod presentation;
pub mod tables;

pub use config::Config;
pub use logging::init_tracing;
