//! API clients for Prisma Cloud

pub mod prismacloud;
pub mod traits;

pub use prismacloud::*;
pub use traits::*;
