//! cuecfg Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the cuecfg
//! project configuration generator, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            cuecfg-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │   (GenerateService, ProjectService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (CatalogSource, DescriptorStore,        │
//! │  Evaluator, Filesystem)                 │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     cuecfg-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Catalog, resolve, select_config, merge)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cuecfg_core::prelude::*;
//!
//! # fn run(catalog: Box<dyn CatalogSource>, store: Box<dyn DescriptorStore>, fs: Box<dyn Filesystem>) -> CuecfgResult<()> {
//! let service = GenerateService::new(catalog, store, fs, None);
//! let report = service.generate(&GenerateOptions::new("."))?;
//! println!("wrote {} files", report.written.len());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, GenerateOptions, GenerateService, ProjectService,
        ports::{CatalogSource, DescriptorStore, EvaluationRequest, Evaluator, Filesystem, LinkKind},
    };
    pub use crate::domain::{
        Backend, Catalog, ConfigSelectionPolicy, DomainError, Feature, FeatureId, MergeDirection,
        ProjectDescriptor, Resolution, merge, resolve, select_config,
    };
    pub use crate::error::{CuecfgError, CuecfgResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
