//! Table plugin contract
//!
//! A [`Table`] is a declarative descriptor: a list of typed [`Column`]s, each
//! with a [`Transform`] that extracts its value from a hydrated item, plus a
//! [`ListConfig`] naming the key columns the host must supply as quals and the
//! [`ListHydrate`] implementation that fetches and streams items.
//!
//! ```text
//! quals ──> key column checks ──> ListHydrate::list ──> QueryData::stream_list_item
//!                                                              │
//!                          Row <── column transforms <─────────┘
//! ```

pub mod column;
pub mod hydrate;
pub mod query_data;
pub mod registry;
pub mod row;
pub mod table;
pub mod transform;

pub use column::*;
pub use hydrate::*;
pub use query_data::*;
pub use registry::*;
pub use row::*;
pub use table::*;
pub use transform::*;
