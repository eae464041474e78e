pub mod catalog;
pub mod descriptor;
pub mod feature;
pub mod manifest;

pub use catalog::{Catalog, CatalogBuilder};
pub use descriptor::{ProjectDescriptor, ProjectMetadata};
pub use feature::{Feature, FeatureBuilder, Fragment};
pub use manifest::{
    CompilerConfigReference, IgnorePatternSet, ManifestBuilder, ManifestDocument, PACKAGE_SCHEMA,
    TSCONFIG_SCHEMA,
};
