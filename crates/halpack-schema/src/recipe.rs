use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::platform::PlatformError;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("failed to read recipe file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse recipe: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported recipe_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("package.name must not be empty")]
    EmptyName,
    #[error("invalid package name '{0}': use lowercase letters, digits, '-', '_' and '.'")]
    InvalidName(String),
    #[error("invalid package version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },
    #[error("invalid version range for {kind} '{name}': '{range}': {reason}")]
    InvalidVersionRange {
        kind: &'static str,
        name: String,
        range: String,
        reason: String,
    },
    #[error("invalid platform option: {0}")]
    Platform(#[from] PlatformError),
    #[error("unknown option '{0}' (this recipe only declares 'platform')")]
    UnknownOption(String),
    #[error("invalid build.min_cppstd '{0}': expected a two-digit standard such as 20")]
    InvalidCppStd(String),
    #[error("invalid minimum version for compiler '{compiler}': '{version}'")]
    InvalidCompilerMinimum { compiler: String, version: String },
    #[error("package_info.libs must list at least one library")]
    NoLibraries,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RecipeV1 {
    pub recipe_version: u32,
    pub package: PackageSection,
    #[serde(default)]
    pub options: OptionsSection,
    #[serde(default)]
    pub requires: BTreeMap<String, String>,
    #[serde(default)]
    pub tool_requires: BTreeMap<String, String>,
    #[serde(default)]
    pub test_requires: BTreeMap<String, String>,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub package_info: PackageInfoSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OptionsSection {
    #[serde(default)]
    pub platform: PlatformSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlatformSection {
    #[serde(default = "default_platform")]
    pub default: String,
    /// Restricts the option to these values when present.
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
    #[serde(default)]
    pub linker_scripts: Vec<String>,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            default: default_platform(),
            allowed: None,
            linker_scripts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default = "default_toolchain")]
    pub toolchain: String,
    #[serde(default)]
    pub min_cppstd: Option<String>,
    #[serde(default)]
    pub exports_sources: Vec<String>,
    #[serde(default)]
    pub compiler_minimum: BTreeMap<String, String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            toolchain: default_toolchain(),
            min_cppstd: None,
            exports_sources: Vec::new(),
            compiler_minimum: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PackageInfoSection {
    #[serde(default)]
    pub cmake_target_name: Option<String>,
    #[serde(default)]
    pub libs: Vec<String>,
    /// Directory under `linker_scripts/` holding this package's scripts.
    #[serde(default)]
    pub linker_script_namespace: Option<String>,
}

fn default_platform() -> String {
    crate::platform::PLATFORM_WILDCARD.to_owned()
}

fn default_toolchain() -> String {
    "cmake".to_owned()
}

pub fn parse_recipe_str(input: &str) -> Result<RecipeV1, RecipeError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_recipe_file(path: impl AsRef<Path>) -> Result<RecipeV1, RecipeError> {
    let content = fs::read_to_string(path)?;
    parse_recipe_str(&content)
}
