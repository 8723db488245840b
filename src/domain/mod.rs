//! Domain Layer - Core entities and value objects
//!
//! This module contains the Prisma Cloud vulnerability dashboard concepts the
//! tables are built on, independent of transport or the table contract.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
