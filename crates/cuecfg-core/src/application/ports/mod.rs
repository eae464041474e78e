//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `cuecfg-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `CatalogSource`: feature catalog loading
//!   - `DescriptorStore`: project descriptor persistence
//!   - `Evaluator`: external declarative evaluator
//!   - `Filesystem`: file operations
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    CatalogSource, DescriptorStore, EvaluationRequest, Evaluator, Filesystem, LinkKind, VetRequest,
};

#[cfg(test)]
pub use output::{MockCatalogSource, MockDescriptorStore, MockEvaluator, MockFilesystem};
