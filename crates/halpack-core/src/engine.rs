use crate::config::RecipeConfig;
use crate::exports::check_exported_sources;
use crate::info::{package_info, PackageInfo};
use crate::layout::{PackageLayout, SourceLayout};
use crate::lifecycle::{validate_transition, BuildRecord, Phase};
use crate::package::{package_files, PackageReport};
use crate::resolver::{package_identity, resolve_platform, PlatformResolution};
use crate::validate::{effective_cppstd, validate_settings};
use crate::CoreError;
use halpack_schema::{
    parse_recipe_file, DependencyConstraint, LockFile, NormalizedRecipe, PackageIdentity,
    PlatformOption, Profile, RequirementTable, Settings,
};
use halpack_toolchain::{
    check_toolchain_prereqs, format_missing, select_toolchain, BuildArtifacts, BuildSpec,
    DependencyResolver, Toolchain, ToolchainError,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Orchestration engine for one recipe.
///
/// Owns the normalized recipe, its source tree, and the toolchain backend the
/// recipe selects. Every lifecycle call takes an immutable [`RecipeConfig`];
/// the engine keeps no per-configuration state, so the same engine can serve
/// any number of configurations.
pub struct Engine {
    recipe_path: PathBuf,
    recipe: NormalizedRecipe,
    source: SourceLayout,
    toolchain: Box<dyn Toolchain>,
}

pub struct BuildResult {
    pub identity: PackageIdentity,
    pub artifacts: BuildArtifacts,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LockOptions {
    /// Verify the existing lock file instead of re-resolving.
    pub locked: bool,
}

/// Record written next to an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub reference: String,
    pub package_id: String,
    pub short_id: String,
    pub settings: Settings,
    pub platform: PlatformOption,
    pub info: PackageInfo,
    pub files: Vec<PathBuf>,
}

impl PackageMetadata {
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_to_file(&self, path: &Path) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateResult {
    pub identity: PackageIdentity,
    pub resolution: PlatformResolution,
    pub report: PackageReport,
    pub metadata: PackageMetadata,
}

impl Engine {
    /// Load and normalize a recipe. The directory holding the recipe file is
    /// the source tree.
    pub fn load(recipe_path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let recipe_path = recipe_path.as_ref();
        debug!("loading recipe {}", recipe_path.display());
        let recipe = parse_recipe_file(recipe_path)?.normalize()?;
        let root = recipe_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let toolchain = select_toolchain(&recipe.toolchain)?;
        Ok(Self {
            recipe_path: recipe_path.to_path_buf(),
            source: SourceLayout::new(root),
            recipe,
            toolchain,
        })
    }

    /// Replace the toolchain the recipe selected.
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Box<dyn Toolchain>) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn recipe(&self) -> &NormalizedRecipe {
        &self.recipe
    }

    pub fn recipe_path(&self) -> &Path {
        &self.recipe_path
    }

    pub fn source(&self) -> &SourceLayout {
        &self.source
    }

    pub fn toolchain_name(&self) -> &str {
        self.toolchain.name()
    }

    pub fn requirements(&self) -> &RequirementTable {
        &self.recipe.requirements
    }

    pub fn config_for(&self, profile: &Profile) -> Result<RecipeConfig, CoreError> {
        RecipeConfig::from_profile(&self.recipe, profile)
    }

    pub fn validate(&self, config: &RecipeConfig) -> Result<(), CoreError> {
        validate_settings(&self.recipe, &config.settings)
    }

    pub fn resolve(&self, config: &RecipeConfig) -> PlatformResolution {
        resolve_platform(&self.recipe.platform, &config.platform, config.settings.os)
    }

    pub fn package_id(&self, config: &RecipeConfig) -> PackageIdentity {
        package_identity(&self.recipe, config)
    }

    /// Pin every declared constraint to a concrete version.
    ///
    /// With `locked`, the existing lock file must be intact and still match
    /// the recipe; nothing is resolved or written.
    pub fn resolve_dependencies(
        &self,
        resolver: &dyn DependencyResolver,
        options: LockOptions,
    ) -> Result<LockFile, CoreError> {
        let path = self.source.lock_file();

        if options.locked {
            if !path.is_file() {
                return Err(CoreError::LockMissing(path));
            }
            let lock = LockFile::read_from_file(&path)?;
            lock.verify_integrity()?;
            lock.verify_recipe_intent(&self.recipe)?;
            info!(
                "lock file verified: {} dependencies pinned",
                lock.resolved.len()
            );
            return Ok(lock);
        }

        let constraints: Vec<DependencyConstraint> =
            self.recipe.requirements.iter().cloned().collect();
        info!(
            "resolving {} constraints for {} with the {} resolver",
            constraints.len(),
            self.recipe.reference(),
            resolver.name()
        );
        let resolution = resolver.resolve(&constraints)?;
        let lock = LockFile::from_resolved(&self.recipe, &resolution);
        lock.write_to_file(&path)?;
        debug!("wrote {}", path.display());
        Ok(lock)
    }

    pub fn build(&self, config: &RecipeConfig) -> Result<BuildResult, CoreError> {
        self.validate(config)?;
        self.build_validated(config)
    }

    fn build_validated(&self, config: &RecipeConfig) -> Result<BuildResult, CoreError> {
        let identity = self.package_id(config);
        info!(
            "building {} ({}) with {}",
            self.recipe.reference(),
            identity.short_id,
            self.toolchain.name()
        );

        check_exported_sources(self.source.root(), &self.recipe.exports_sources)?;

        let missing = check_toolchain_prereqs(
            self.toolchain.name(),
            &config.settings.compiler,
            config.settings.os,
        );
        if !missing.is_empty() {
            return Err(ToolchainError::Unavailable(format_missing(&missing)).into());
        }

        let spec = BuildSpec {
            package: self.recipe.name.clone(),
            version: self.recipe.version.to_string(),
            source_dir: self.source.root().to_path_buf(),
            build_dir: self.source.build_dir(config.settings.build_type),
            settings: config.settings.clone(),
            cxx_standard: effective_cppstd(&self.recipe, &config.settings),
            libs: self.recipe.libs.clone(),
        };
        let artifacts = self.toolchain.configure_build(&spec)?;
        debug!(
            "build produced {} libraries in {}",
            artifacts.libraries.len(),
            artifacts.build_dir.display()
        );
        BuildRecord {
            package_id: identity.package_id.to_string(),
            phase: Phase::Validated,
            artifacts: artifacts.clone(),
        }
        .advance(Phase::Built, &spec.build_dir)?;
        Ok(BuildResult {
            identity,
            artifacts,
        })
    }

    /// Phase the build tree holds for this configuration.
    pub fn phase(&self, config: &RecipeConfig) -> Result<Phase, CoreError> {
        let record = BuildRecord::read(&self.source.build_dir(config.settings.build_type))?;
        let identity = self.package_id(config);
        Ok(BuildRecord::phase_of(
            record.as_ref(),
            &identity.package_id,
        ))
    }

    /// Artifacts a previous build left for this configuration.
    pub fn existing_artifacts(&self, config: &RecipeConfig) -> Result<BuildArtifacts, CoreError> {
        let build_type = config.settings.build_type;
        let build_dir = self.source.build_dir(build_type);
        Ok(match BuildRecord::read(&build_dir)? {
            Some(record) => record.artifacts,
            None => BuildArtifacts::at(build_dir, build_type, &self.recipe.libs),
        })
    }

    /// Populate `package_folder` from the source tree and the build outputs.
    ///
    /// The build tree must hold a finished build of this configuration, and
    /// every artifact must exist, before anything is written.
    pub fn package(
        &self,
        config: &RecipeConfig,
        artifacts: &BuildArtifacts,
        package_folder: &Path,
    ) -> Result<(PackageReport, PackageMetadata), CoreError> {
        let identity = self.package_id(config);
        let build_dir = self.source.build_dir(config.settings.build_type);
        let record = BuildRecord::read(&build_dir)?
            .filter(|r| r.package_id == *identity.package_id)
            .unwrap_or_else(|| BuildRecord {
                package_id: identity.package_id.to_string(),
                phase: Phase::Loaded,
                artifacts: artifacts.clone(),
            });
        validate_transition(record.phase, Phase::Packaged)?;
        if let Some(missing) = artifacts.libraries.iter().find(|lib| !lib.is_file()) {
            return Err(ToolchainError::ArtifactMissing(missing.clone()).into());
        }

        info!(
            "packaging {} into {}",
            self.recipe.reference(),
            package_folder.display()
        );
        let layout = PackageLayout::new(package_folder);
        let with_scripts = !self.recipe.platform.linker_scripts.is_empty();
        let report = package_files(&self.source, &layout, with_scripts)?;
        self.toolchain.install(artifacts, package_folder)?;

        let metadata = PackageMetadata {
            reference: self.recipe.reference(),
            package_id: identity.package_id.to_string(),
            short_id: identity.short_id.to_string(),
            settings: config.settings.clone(),
            platform: config.platform.clone(),
            info: self.package_info(config, package_folder),
            files: report.files.clone(),
        };
        metadata.write_to_file(&layout.metadata_file())?;
        record.advance(Phase::Packaged, &build_dir)?;
        debug!(
            "{} files copied, {} unchanged",
            report.copied, report.unchanged
        );
        Ok((report, metadata))
    }

    pub fn package_info(&self, config: &RecipeConfig, package_folder: &Path) -> PackageInfo {
        package_info(&self.recipe, config, package_folder)
    }

    /// Validate, build, and package one configuration.
    pub fn create(
        &self,
        config: &RecipeConfig,
        package_folder: &Path,
    ) -> Result<CreateResult, CoreError> {
        self.validate(config)?;
        let build = self.build_validated(config)?;
        let (report, metadata) = self.package(config, &build.artifacts, package_folder)?;

        info!(
            "created {} package {}",
            self.recipe.reference(),
            build.identity.short_id
        );
        Ok(CreateResult {
            identity: build.identity,
            resolution: self.resolve(config),
            report,
            metadata,
        })
    }
}
