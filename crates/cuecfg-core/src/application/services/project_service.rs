//! Project Service - descriptor use cases.
//!
//! Creating and editing `dependencies.json`, validating it against the
//! catalog, and describing what the catalog offers. When an evaluator is
//! attached, validation also vets the descriptor against the catalog's
//! `dependencies/schema.cue`.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CatalogSource, DescriptorStore, Evaluator, Filesystem, VetRequest},
    },
    domain::{
        Catalog, DomainValidator as validator, FeatureId, ProjectDescriptor, Resolution, resolve,
    },
    error::{CuecfgError, CuecfgResult},
};

/// Entry point created by `init` when the project has none.
pub const ENTRY_POINT: &str = "src/index.ts";

const ENTRY_POINT_CONTENTS: &str = "// Entry point\nexport {};\n";

/// Descriptor schema, relative to the catalog root.
const DESCRIPTOR_SCHEMA: &str = "dependencies/schema.cue";

/// Definition in the descriptor schema the descriptor must satisfy.
const DESCRIPTOR_DEFINITION: &str = "#Dependencies";

/// What `init` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub preset: String,
    pub features: Vec<FeatureId>,
    pub descriptor_path: PathBuf,
    /// `false` when an existing descriptor was kept.
    pub descriptor_written: bool,
    /// Set when the entry point file was created.
    pub entry_point: Option<PathBuf>,
}

/// Outcome of adding or removing a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    Unchanged,
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub descriptor_path: PathBuf,
    pub requested: Vec<FeatureId>,
    pub resolution: Resolution,
    /// Set when the descriptor was also vetted against the catalog schema.
    pub schema_checked: bool,
}

/// A catalog feature, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureInfo {
    pub id: String,
    pub prerequisites: Vec<String>,
    pub compiler_config: Option<String>,
    pub auxiliary_schema: bool,
}

/// A catalog preset, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: String,
    pub features: Vec<String>,
    pub is_default: bool,
}

/// Everything the catalog offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogListing {
    pub source: String,
    pub features: Vec<FeatureInfo>,
    pub presets: Vec<PresetInfo>,
}

/// Descriptor use cases.
pub struct ProjectService {
    catalog: Box<dyn CatalogSource>,
    descriptors: Box<dyn DescriptorStore>,
    filesystem: Box<dyn Filesystem>,
    evaluator: Option<Box<dyn Evaluator>>,
}

impl ProjectService {
    pub fn new(
        catalog: Box<dyn CatalogSource>,
        descriptors: Box<dyn DescriptorStore>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            catalog,
            descriptors,
            filesystem,
            evaluator: None,
        }
    }

    /// Attach an evaluator for the schema check in `validate`.
    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Write a descriptor listing a preset's features.
    ///
    /// An existing descriptor is kept unless `force` is set. The entry point
    /// is created when missing either way.
    #[instrument(skip_all, fields(project = %project_dir.display(), preset = ?preset))]
    pub fn init(
        &self,
        project_dir: &Path,
        preset: Option<&str>,
        force: bool,
    ) -> CuecfgResult<InitReport> {
        let catalog = self.catalog.load()?;
        let preset = preset.unwrap_or_else(|| catalog.default_preset()).to_string();
        let features = catalog.require_preset(&preset)?.to_vec();

        let descriptor_path = self.descriptors.location(project_dir);
        let exists = self.descriptors.load(project_dir)?.is_some();

        let descriptor_written = if exists && !force {
            warn!(path = %descriptor_path.display(), "Descriptor already exists, keeping it");
            false
        } else {
            self.filesystem.create_dir_all(project_dir)?;
            self.descriptors
                .save(project_dir, &ProjectDescriptor::new(features.iter().cloned()))?;
            info!(path = %descriptor_path.display(), "Descriptor written");
            true
        };

        let entry_point = self.ensure_entry_point(project_dir)?;

        Ok(InitReport {
            preset,
            features,
            descriptor_path,
            descriptor_written,
            entry_point,
        })
    }

    /// Append a catalog feature to the descriptor, creating it if needed.
    #[instrument(skip_all, fields(project = %project_dir.display(), feature = %feature))]
    pub fn add(&self, project_dir: &Path, feature: &str) -> CuecfgResult<Change> {
        let catalog = self.catalog.load()?;
        let id = validator::validate_feature(feature, &catalog)?;

        let mut descriptor = self.descriptors.load(project_dir)?.unwrap_or_default();
        if !descriptor.add(id) {
            info!("Feature already requested");
            return Ok(Change::Unchanged);
        }

        self.descriptors.save(project_dir, &descriptor)?;
        Ok(Change::Applied)
    }

    /// Remove the first occurrence of a feature from the descriptor.
    #[instrument(skip_all, fields(project = %project_dir.display(), feature = %feature))]
    pub fn remove(&self, project_dir: &Path, feature: &str) -> CuecfgResult<Change> {
        let mut descriptor = self.require_descriptor(project_dir)?;
        if !descriptor.remove(feature) {
            info!("Feature not requested");
            return Ok(Change::Unchanged);
        }

        self.descriptors.save(project_dir, &descriptor)?;
        Ok(Change::Applied)
    }

    /// Check that every requested feature exists in the catalog.
    ///
    /// The schema check runs only with an available evaluator and a
    /// catalog directory that ships the descriptor schema.
    #[instrument(skip_all, fields(project = %project_dir.display()))]
    pub fn validate(&self, project_dir: &Path) -> CuecfgResult<ValidationReport> {
        let descriptor = self.require_descriptor(project_dir)?;
        let catalog = self.catalog.load()?;

        validator::validate_descriptor(&descriptor, &catalog)?;
        let resolution = resolve(descriptor.features(), &catalog);

        let descriptor_path = self.descriptors.location(project_dir);
        let schema_checked = self.vet_descriptor(&catalog, project_dir, &descriptor_path)?;

        Ok(ValidationReport {
            descriptor_path,
            requested: descriptor.features().to_vec(),
            resolution,
            schema_checked,
        })
    }

    /// Describe the catalog's features and presets.
    pub fn list(&self) -> CuecfgResult<CatalogListing> {
        let catalog = self.catalog.load()?;
        Ok(listing(&catalog, self.catalog.describe()))
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn require_descriptor(&self, project_dir: &Path) -> CuecfgResult<ProjectDescriptor> {
        self.descriptors.load(project_dir)?.ok_or_else(|| {
            ApplicationError::DescriptorMissing {
                path: self.descriptors.location(project_dir),
            }
            .into()
        })
    }

    fn vet_descriptor(
        &self,
        catalog: &Catalog,
        project_dir: &Path,
        descriptor_path: &Path,
    ) -> CuecfgResult<bool> {
        let Some(evaluator) = self.evaluator.as_deref() else {
            return Ok(false);
        };
        let Some(root) = catalog.root() else {
            debug!("Catalog has no directory, skipping schema check");
            return Ok(false);
        };
        let schema = root.join(DESCRIPTOR_SCHEMA);
        if !self.filesystem.exists(&schema) {
            debug!(schema = %schema.display(), "No descriptor schema, skipping schema check");
            return Ok(false);
        }
        if !evaluator.is_available() {
            warn!(program = %evaluator.program(), "Evaluator not available, skipping schema check");
            return Ok(false);
        }

        // The evaluator runs inside the project, so the data path is relative to it.
        let data = descriptor_path
            .strip_prefix(project_dir)
            .unwrap_or(descriptor_path)
            .to_path_buf();
        let request = VetRequest {
            working_dir: project_dir.to_path_buf(),
            schema,
            definition: DESCRIPTOR_DEFINITION.to_string(),
            data,
        };
        match evaluator.vet(&request) {
            Ok(()) => Ok(true),
            Err(CuecfgError::Application(ApplicationError::EvaluationFailed {
                diagnostic, ..
            })) => Err(ApplicationError::DescriptorMalformed {
                path: descriptor_path.to_path_buf(),
                reason: diagnostic.trim().to_string(),
            }
            .into()),
            Err(e) => Err(e),
        }
    }

    fn ensure_entry_point(&self, project_dir: &Path) -> CuecfgResult<Option<PathBuf>> {
        let path = project_dir.join(ENTRY_POINT);
        if self.filesystem.exists(&path) {
            return Ok(None);
        }
        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&path, ENTRY_POINT_CONTENTS)?;
        info!(path = %path.display(), "Entry point created");
        Ok(Some(path))
    }
}

fn listing(catalog: &Catalog, source: String) -> CatalogListing {
    let features = catalog
        .features()
        .into_iter()
        .map(|feature| FeatureInfo {
            id: feature.id().to_string(),
            prerequisites: feature
                .prerequisites()
                .iter()
                .map(ToString::to_string)
                .collect(),
            compiler_config: feature.config_selector().map(String::from),
            auxiliary_schema: feature.requires_auxiliary_schema(),
        })
        .collect();

    let presets = catalog
        .presets()
        .map(|(name, ids)| PresetInfo {
            name: name.to_string(),
            features: ids.iter().map(ToString::to_string).collect(),
            is_default: name == catalog.default_preset(),
        })
        .collect();

    CatalogListing {
        source,
        features,
        presets,
    }
}
