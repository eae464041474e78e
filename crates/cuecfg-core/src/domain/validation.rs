use crate::domain::{
    entities::{Catalog, ProjectDescriptor},
    error::DomainError,
    value_objects::FeatureId,
};

/// Centralized domain validation.
///
/// Resolution tolerates unknown features; the checks here are the strict
/// variants used by commands that must refuse them.
pub struct DomainValidator;

impl DomainValidator {
    /// Parse a user-supplied id and require it to exist in the catalog.
    pub fn validate_feature(id: &str, catalog: &Catalog) -> Result<FeatureId, DomainError> {
        let id = FeatureId::parse(id)?;
        catalog.require_feature(id.as_str())?;
        Ok(id)
    }

    /// Every requested feature must be known to the catalog.
    ///
    /// Fails on the first unknown feature, in request order.
    pub fn validate_descriptor(
        descriptor: &ProjectDescriptor,
        catalog: &Catalog,
    ) -> Result<(), DomainError> {
        for id in descriptor.features() {
            FeatureId::parse(id.as_str())?;
            catalog.require_feature(id.as_str())?;
        }
        Ok(())
    }
}
