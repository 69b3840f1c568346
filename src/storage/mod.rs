//! Storage backends for GraphDone
//!
//! Backends implement the `GraphStore` trait. `JsonFileStore` keeps one
//! snapshot file per graph; `MemoryStore` keeps everything in process.

mod json;
mod memory;
mod traits;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{GraphStore, StorageError, StorageResult};
