//! Generate Service - main application orchestrator.
//!
//! This service coordinates the whole generate workflow:
//! 1. Load catalog and descriptor
//! 2. Resolve the requested features
//! 3. Produce every artifact (native merge or external evaluator)
//! 4. Write all artifacts, or none
//! 5. Link the auxiliary schema directory when a feature asks for it

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CatalogSource, DescriptorStore, EvaluationRequest, Evaluator, Filesystem, LinkKind},
    },
    domain::{
        Backend, Catalog, CompilerConfigReference, ConfigSelectionPolicy, DomainError, FeatureId,
        IgnorePatternSet, ManifestDocument, MergeDirection, ProjectDescriptor, Resolution,
        apply_overrides_to, merge, reconcile, render_ignore, resolve, select_config,
    },
    error::{CuecfgError, CuecfgResult},
};

/// Manifest sources, relative to the catalog root.
const MANIFEST_SOURCE_DIR: &str = "npm/package";
/// Ignore-pattern sources, relative to the catalog root.
const IGNORE_SOURCE_DIR: &str = "git/ignore";
/// Source evaluated for every output.
const BASE_SOURCE: &str = "base.cue";

/// Directory name the catalog root is linked under inside `cue.mod/pkg`.
pub const SCHEMA_PACKAGE: &str = "cuecfg.catalog";

const MODULE_FILE: &str = "module.cue";
const MODULE_FILE_CONTENTS: &str =
    "module: \"project.local\"\nlanguage: {\n\tversion: \"v0.15.1\"\n}\n";

// ── Options ──────────────────────────────────────────────────────────────────

/// Options controlling one generate run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub project_dir: PathBuf,
    pub backend: Backend,
    pub policy: ConfigSelectionPolicy,
    pub merge_existing: bool,
    pub direction: MergeDirection,
    pub dry_run: bool,
}

impl GenerateOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            backend: Backend::default(),
            policy: ConfigSelectionPolicy::default(),
            merge_existing: false,
            direction: MergeDirection::default(),
            dry_run: false,
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn policy(mut self, policy: ConfigSelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn merge_existing(mut self, enabled: bool) -> Self {
        self.merge_existing = enabled;
        self
    }

    pub fn direction(mut self, direction: MergeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// ── Plan ─────────────────────────────────────────────────────────────────────

/// The files a generate run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Manifest,
    CompilerConfig,
    IgnoreFile,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Manifest => "package.json",
            Self::CompilerConfig => "tsconfig.json",
            Self::IgnoreFile => ".gitignore",
        }
    }
}

/// One fully rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub contents: String,
}

/// Post-merge step linking the catalog's schema directory into the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLink {
    pub module_file: PathBuf,
    pub source: PathBuf,
    pub link: PathBuf,
}

/// Everything a generate run would do, computed before any write.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub resolution: Resolution,
    pub compiler_config: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub schema_link: Option<SchemaLink>,
}

impl GenerationPlan {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// What a generate run did.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub plan: GenerationPlan,
    /// Files written, in order. Empty for a dry run.
    pub written: Vec<PathBuf>,
    pub link: Option<LinkKind>,
    pub dry_run: bool,
}

// ── Service ──────────────────────────────────────────────────────────────────

/// Main generate orchestrator.
pub struct GenerateService {
    catalog: Box<dyn CatalogSource>,
    descriptors: Box<dyn DescriptorStore>,
    filesystem: Box<dyn Filesystem>,
    evaluator: Option<Box<dyn Evaluator>>,
}

impl GenerateService {
    /// Create a generate service. The evaluator is only needed for
    /// [`Backend::Cue`].
    pub fn new(
        catalog: Box<dyn CatalogSource>,
        descriptors: Box<dyn DescriptorStore>,
        filesystem: Box<dyn Filesystem>,
        evaluator: Option<Box<dyn Evaluator>>,
    ) -> Self {
        Self {
            catalog,
            descriptors,
            filesystem,
            evaluator,
        }
    }

    /// Generate the project files.
    ///
    /// Nothing is written when planning fails. A failed write restores the
    /// files written before it.
    #[instrument(
        skip_all,
        fields(
            project = %options.project_dir.display(),
            backend = %options.backend,
            dry_run = options.dry_run
        )
    )]
    pub fn generate(&self, options: &GenerateOptions) -> CuecfgResult<GenerationReport> {
        let plan = self.plan(options)?;

        if options.dry_run {
            info!(artifacts = plan.artifacts.len(), "Dry run, nothing written");
            return Ok(GenerationReport {
                plan,
                written: Vec::new(),
                link: None,
                dry_run: true,
            });
        }

        let written = self.write_artifacts(&plan.artifacts)?;
        let link = match &plan.schema_link {
            Some(step) => Some(self.link_schema(step)?),
            None => None,
        };

        info!(files = written.len(), "Generate completed successfully");
        Ok(GenerationReport {
            plan,
            written,
            link,
            dry_run: false,
        })
    }

    /// Compute every artifact without touching the project.
    pub fn plan(&self, options: &GenerateOptions) -> CuecfgResult<GenerationPlan> {
        let catalog = self.catalog.load()?;
        let descriptor = self.descriptors.load(&options.project_dir)?.ok_or_else(|| {
            ApplicationError::DescriptorMissing {
                path: self.descriptors.location(&options.project_dir),
            }
        })?;

        let resolution = resolve(descriptor.features(), &catalog);
        info!(
            resolved = resolution.features().len(),
            unknown = resolution.unknown().len(),
            "Features resolved"
        );

        let (manifest, ignore) = match options.backend {
            Backend::Native => {
                let outcome = merge(&resolution, &catalog, &descriptor);
                let ignore = render_ignore(&outcome.ignore_modules, &catalog);
                (outcome.manifest, ignore)
            }
            Backend::Cue => self.evaluate_outputs(&resolution, &catalog, &descriptor)?,
        };

        let manifest = if options.merge_existing {
            self.reconcile_existing(manifest, options)?
        } else {
            manifest
        };

        let compiler_config = select_config(
            &resolution,
            &catalog,
            descriptor.compiler_config(),
            options.policy,
        );

        let dir = &options.project_dir;
        let mut artifacts = vec![Artifact {
            kind: ArtifactKind::Manifest,
            path: dir.join(ArtifactKind::Manifest.file_name()),
            contents: manifest.render(),
        }];
        if let Some(id) = &compiler_config {
            let reference = CompilerConfigReference::new(id.as_str(), catalog.compiler_config_base());
            artifacts.push(Artifact {
                kind: ArtifactKind::CompilerConfig,
                path: dir.join(ArtifactKind::CompilerConfig.file_name()),
                contents: reference.render(),
            });
        }
        artifacts.push(Artifact {
            kind: ArtifactKind::IgnoreFile,
            path: dir.join(ArtifactKind::IgnoreFile.file_name()),
            contents: ignore.render(),
        });

        let schema_link = schema_link(&resolution, &catalog, dir);

        Ok(GenerationPlan {
            resolution,
            compiler_config,
            artifacts,
            schema_link,
        })
    }

    // -------------------------------------------------------------------------
    // Evaluator backend
    // -------------------------------------------------------------------------

    fn evaluate_outputs(
        &self,
        resolution: &Resolution,
        catalog: &Catalog,
        descriptor: &ProjectDescriptor,
    ) -> CuecfgResult<(ManifestDocument, IgnorePatternSet)> {
        let evaluator = self.evaluator.as_deref().ok_or_else(|| CuecfgError::Configuration {
            message: "the cue backend was selected but no evaluator is configured".into(),
        })?;
        if !evaluator.is_available() {
            return Err(ApplicationError::EvaluatorUnavailable {
                program: evaluator.program(),
                reason: "program could not be started".into(),
            }
            .into());
        }

        let root = catalog.root().ok_or_else(|| CuecfgError::Configuration {
            message: "the cue backend needs a catalog loaded from a directory holding its sources"
                .into(),
        })?;

        let manifest_dir = root.join(MANIFEST_SOURCE_DIR);
        let request = EvaluationRequest {
            sources: self.sources(&manifest_dir, resolution, |id| id.to_field_name()),
            working_dir: manifest_dir,
            expression: "output".into(),
            output: ArtifactKind::Manifest.file_name().into(),
        };
        let generated = evaluator.evaluate(&request)?;
        let manifest = apply_overrides_to(generated, descriptor)?;

        let ignore_dir = root.join(IGNORE_SOURCE_DIR);
        let request = EvaluationRequest {
            sources: self.sources(&ignore_dir, resolution, |id| id.to_string()),
            working_dir: ignore_dir,
            expression: "patterns".into(),
            output: ArtifactKind::IgnoreFile.file_name().into(),
        };
        let patterns = evaluator.evaluate(&request)?;
        let ignore = ignore_lines(patterns, &request.output)?;

        Ok((manifest, ignore))
    }

    /// `base.cue` followed by each resolved feature's source that exists.
    fn sources(
        &self,
        dir: &Path,
        resolution: &Resolution,
        name: impl Fn(&FeatureId) -> String,
    ) -> Vec<String> {
        let mut sources = vec![BASE_SOURCE.to_string()];
        for id in resolution.features() {
            let file = format!("{}.cue", name(id));
            if self.filesystem.exists(&dir.join(&file)) {
                sources.push(file);
            } else {
                debug!(feature = %id, dir = %dir.display(), "No evaluator source for feature");
            }
        }
        sources
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn reconcile_existing(
        &self,
        generated: ManifestDocument,
        options: &GenerateOptions,
    ) -> CuecfgResult<ManifestDocument> {
        let path = options
            .project_dir
            .join(ArtifactKind::Manifest.file_name());
        let Some(text) = self.filesystem.read_to_string(&path)? else {
            debug!(path = %path.display(), "No existing manifest to merge with");
            return Ok(generated);
        };

        let existing: Value = serde_json::from_str(&text).map_err(|e| {
            DomainError::InvalidManifest(format!("{}: {e}", path.display()))
        })?;
        info!(path = %path.display(), direction = %options.direction, "Merging with existing manifest");
        Ok(reconcile(&generated, &existing, options.direction)?)
    }

    /// Write every artifact, restoring previous contents if any write fails.
    fn write_artifacts(&self, artifacts: &[Artifact]) -> CuecfgResult<Vec<PathBuf>> {
        // Snapshots are taken up front so a failing read aborts before any write.
        let mut snapshots = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            snapshots.push(self.filesystem.read_to_string(&artifact.path)?);
        }

        let mut written = Vec::with_capacity(artifacts.len());
        for (index, artifact) in artifacts.iter().enumerate() {
            if let Err(e) = self.write_one(artifact) {
                warn!(path = %artifact.path.display(), error = %e, "Write failed, attempting rollback");
                self.rollback(&artifacts[..index], &snapshots[..index]);
                return Err(e);
            }
            debug!(path = %artifact.path.display(), "Artifact written");
            written.push(artifact.path.clone());
        }
        Ok(written)
    }

    fn write_one(&self, artifact: &Artifact) -> CuecfgResult<()> {
        if let Some(parent) = artifact.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(&artifact.path, &artifact.contents)
    }

    /// Best-effort restore of already written artifacts.
    fn rollback(&self, artifacts: &[Artifact], snapshots: &[Option<String>]) {
        for (artifact, snapshot) in artifacts.iter().zip(snapshots).rev() {
            let result = match snapshot {
                Some(previous) => self.filesystem.write_file(&artifact.path, previous),
                None => self.filesystem.remove_file(&artifact.path),
            };
            match result {
                Ok(()) => debug!(path = %artifact.path.display(), "Restored"),
                Err(e) => warn!(
                    error = %e,
                    path = %artifact.path.display(),
                    "Rollback failed"
                ),
            }
        }
    }

    fn link_schema(&self, step: &SchemaLink) -> CuecfgResult<LinkKind> {
        if let Some(parent) = step.module_file.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem
            .write_file(&step.module_file, MODULE_FILE_CONTENTS)?;

        if let Some(parent) = step.link.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        let kind = self.filesystem.link_or_copy_dir(&step.source, &step.link)?;
        info!(link = %step.link.display(), kind = ?kind, "Schema directory linked");
        Ok(kind)
    }
}

fn schema_link(resolution: &Resolution, catalog: &Catalog, project_dir: &Path) -> Option<SchemaLink> {
    let needed = resolution
        .features()
        .iter()
        .filter_map(|id| catalog.feature(id.as_str()))
        .any(|feature| feature.requires_auxiliary_schema());
    if !needed {
        return None;
    }

    let Some(source) = catalog.root() else {
        warn!("Schema directory requested but the catalog has no directory on disk, skipping link");
        return None;
    };

    let cue_mod = project_dir.join("cue.mod");
    Some(SchemaLink {
        module_file: cue_mod.join(MODULE_FILE),
        source: source.to_path_buf(),
        link: cue_mod.join("pkg").join(SCHEMA_PACKAGE),
    })
}

fn ignore_lines(value: Value, output: &str) -> CuecfgResult<IgnorePatternSet> {
    let invalid = || ApplicationError::EvaluationFailed {
        output: output.to_string(),
        diagnostic: "expected a JSON array of strings".into(),
    };

    let Value::Array(items) = value else {
        return Err(invalid().into());
    };
    let lines = items
        .into_iter()
        .map(|item| match item {
            Value::String(line) => Ok(line),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IgnorePatternSet::new(lines))
}
