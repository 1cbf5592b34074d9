use crate::ToolchainError;
use halpack_schema::{BuildType, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a toolchain needs to configure and compile one package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildSpec {
    pub package: String,
    pub version: String,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub settings: Settings,
    /// C++ standard passed to the compiler: the profile's setting, or the
    /// recipe minimum when the profile leaves it unset.
    pub cxx_standard: Option<String>,
    pub libs: Vec<String>,
}

/// Where a successful build left its outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildArtifacts {
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    pub libraries: Vec<PathBuf>,
}

impl BuildArtifacts {
    /// Describe an existing build folder, e.g. one produced by an earlier run.
    pub fn at(build_dir: impl Into<PathBuf>, build_type: BuildType, libs: &[String]) -> Self {
        let build_dir = build_dir.into();
        let libraries = libs
            .iter()
            .map(|lib| build_dir.join(static_library_name(lib)))
            .collect();
        Self {
            build_dir,
            build_type,
            libraries,
        }
    }
}

/// File name of a static archive for a library name (`lib<name>.a`).
pub fn static_library_name(lib: &str) -> String {
    format!("lib{lib}.a")
}

pub trait Toolchain: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    /// Configure and compile the sources described by `spec`.
    fn configure_build(&self, spec: &BuildSpec) -> Result<BuildArtifacts, ToolchainError>;

    /// Install the build outputs under `prefix`.
    fn install(&self, artifacts: &BuildArtifacts, prefix: &Path) -> Result<(), ToolchainError>;
}

pub fn select_toolchain(name: &str) -> Result<Box<dyn Toolchain>, ToolchainError> {
    match name {
        "cmake" => Ok(Box::new(crate::cmake::CmakeToolchain::new())),
        "mock" => Ok(Box::new(crate::mock::MockToolchain::new())),
        other => Err(ToolchainError::Unavailable(other.to_owned())),
    }
}
