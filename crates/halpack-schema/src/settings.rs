//! Build settings and profiles.
//!
//! A profile is the explicit configuration a consumer supplies for one build:
//! target OS class, architecture, build type, compiler, and option values.
//! Every resolver and validation call receives these values as an immutable
//! [`Settings`] struct; nothing is read from the process environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse profile: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("profile is missing setting '{0}'")]
    MissingSetting(&'static str),
    #[error("setting '{0}' must not be empty")]
    EmptySetting(&'static str),
    #[error("unknown os '{0}' (expected baremetal, linux, macos, windows, freebsd)")]
    UnknownOs(String),
    #[error("unknown build_type '{0}' (expected Debug, Release, RelWithDebInfo, MinSizeRel)")]
    UnknownBuildType(String),
}

/// Execution environment class of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OsClass {
    Baremetal,
    Linux,
    Macos,
    Windows,
    Freebsd,
}

impl OsClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baremetal => "baremetal",
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Freebsd => "freebsd",
        }
    }

    pub fn is_bare_metal(self) -> bool {
        self == Self::Baremetal
    }
}

impl fmt::Display for OsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsClass {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baremetal" => Ok(Self::Baremetal),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            "freebsd" => Ok(Self::Freebsd),
            _ => Err(ProfileError::UnknownOs(s.to_owned())),
        }
    }
}

impl TryFrom<String> for OsClass {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OsClass> for String {
    fn from(value: OsClass) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// CMake spelling, also used as the build folder name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            _ => Err(ProfileError::UnknownBuildType(s.to_owned())),
        }
    }
}

impl TryFrom<String> for BuildType {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BuildType> for String {
    fn from(value: BuildType) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: OsClass,
    pub arch: String,
    pub build_type: BuildType,
    pub compiler: CompilerSettings,
}

/// Map a C++ standard setting (`20`, `gnu17`, `98`) to its publication year.
///
/// Returns `None` for values that are not a two-digit standard.
pub fn cppstd_year(value: &str) -> Option<u16> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix("gnu").unwrap_or(trimmed);
    if digits.len() != 2 {
        return None;
    }
    let n: u16 = digits.parse().ok()?;
    if n >= 98 {
        Some(1900 + n)
    } else {
        Some(2000 + n)
    }
}

/// Profile as written on disk. Every field is optional so that command-line
/// overrides can fill gaps before [`ProfileV1::resolve`] checks completeness.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1 {
    #[serde(default)]
    pub settings: RawSettings,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub build_type: Option<String>,
    #[serde(default)]
    pub compiler: RawCompiler,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawCompiler {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub cppstd: Option<String>,
}

/// A complete profile: validated settings plus raw option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub settings: Settings,
    pub options: BTreeMap<String, String>,
}

impl ProfileV1 {
    pub fn resolve(&self) -> Result<Profile, ProfileError> {
        let raw = &self.settings;
        let os = required(raw.os.as_ref(), "os")?.parse()?;
        let arch = required(raw.arch.as_ref(), "arch")?;
        let build_type = required(raw.build_type.as_ref(), "build_type")?.parse()?;
        let name = required(raw.compiler.name.as_ref(), "compiler.name")?;
        let version = required(raw.compiler.version.as_ref(), "compiler.version")?;
        let cppstd = raw
            .compiler
            .cppstd
            .as_ref()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        let options = self
            .options
            .iter()
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .collect();

        Ok(Profile {
            settings: Settings {
                os,
                arch,
                build_type,
                compiler: CompilerSettings {
                    name: name.to_lowercase(),
                    version,
                    cppstd,
                },
            },
            options,
        })
    }
}

fn required(value: Option<&String>, key: &'static str) -> Result<String, ProfileError> {
    let value = value.ok_or(ProfileError::MissingSetting(key))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::EmptySetting(key));
    }
    Ok(trimmed.to_owned())
}

pub fn parse_profile_str(input: &str) -> Result<ProfileV1, ProfileError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_profile_file(path: impl AsRef<Path>) -> Result<ProfileV1, ProfileError> {
    let content = fs::read_to_string(path)?;
    parse_profile_str(&content)
}
