//! Catalog sources: JSON files on disk and the built-in catalog.

mod discovery;
mod loader;

pub use discovery::{
    BuiltinCatalog, CATALOG_ENV, CATALOG_FILE, CatalogLocation, discover, locate,
};
pub use loader::{CatalogManifest, FeatureEntry, JsonCatalogSource, parse_catalog};
