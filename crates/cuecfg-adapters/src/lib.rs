//! Infrastructure adapters for cuecfg.
//!
//! This crate implements the ports defined in `cuecfg-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod catalog;
pub mod descriptor_store;
pub mod evaluator;
pub mod filesystem;

// Re-export commonly used adapters
pub use catalog::{BuiltinCatalog, JsonCatalogSource};
pub use descriptor_store::JsonDescriptorStore;
pub use evaluator::CueEvaluator;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
