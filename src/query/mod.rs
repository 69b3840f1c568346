//! Read-side queries over a work graph
//!
//! Node and edge lookups with filtering and pagination, plus summary
//! statistics.

mod edges;
mod find;
mod stats;
mod types;

pub use edges::EdgeQuery;
pub use find::{NodeQuery, DEFAULT_LIMIT};
pub use stats::GraphStats;
pub use types::{EdgeQueryResult, QueryResult};
