//! Core orchestration for halpack recipes.
//!
//! This crate ties the schema layer and the external toolchain together into
//! the `Engine`, the API an orchestrator drives through a recipe's lifecycle:
//! requirements, validation, package identity, dependency locking, build,
//! package, and package info. The decision logic lives in three small pure
//! modules: `resolver` (does this platform need a linker script, does it
//! belong in the package identity), `linker` (which flags consumers get), and
//! `validate` (compiler and C++ standard floors).

pub mod config;
pub mod engine;
pub mod exports;
pub mod info;
pub mod layout;
pub mod lifecycle;
pub mod linker;
pub mod package;
pub mod resolver;
pub mod validate;

pub use config::RecipeConfig;
pub use engine::{BuildResult, CreateResult, Engine, LockOptions, PackageMetadata};
pub use exports::check_exported_sources;
pub use info::{package_info, PackageInfo};
pub use layout::{PackageLayout, SourceLayout};
pub use lifecycle::{validate_transition, BuildRecord, Phase};
pub use linker::{linker_directive, LinkerDirective, LINKER_SCRIPTS_DIR};
pub use package::{package_files, PackageReport};
pub use resolver::{identity_options, package_identity, resolve_platform, PlatformResolution};
pub use validate::{effective_cppstd, validate_settings};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("recipe error: {0}")]
    Recipe(#[from] halpack_schema::RecipeError),
    #[error("profile error: {0}")]
    Profile(#[from] halpack_schema::ProfileError),
    #[error("lock error: {0}")]
    Lock(#[from] halpack_schema::LockError),
    #[error("toolchain error: {0}")]
    Toolchain(#[from] halpack_toolchain::ToolchainError),
    #[error("compiler.cppstd {actual} is below the required minimum {required}")]
    CppStdTooLow { required: String, actual: String },
    #[error("invalid compiler.cppstd '{0}'")]
    InvalidCppStd(String),
    #[error("{compiler} {actual} is older than the required minimum {required}")]
    CompilerTooOld {
        compiler: String,
        required: String,
        actual: String,
    },
    #[error("invalid version '{version}' for compiler '{compiler}'")]
    InvalidCompilerVersion { compiler: String, version: String },
    #[error("missing package source: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("lock file not found: {} (run 'halpack lock' first)", .0.display())]
    LockMissing(PathBuf),
    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Errors caused by the recipe, profile, or lock file rather than by the
    /// toolchain or the filesystem.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Recipe(_)
            | Self::Profile(_)
            | Self::Lock(_)
            | Self::CppStdTooLow { .. }
            | Self::InvalidCppStd(_)
            | Self::CompilerTooOld { .. }
            | Self::InvalidCompilerVersion { .. }
            | Self::LockMissing(_) => true,
            Self::Toolchain(e) => {
                matches!(e, halpack_toolchain::ToolchainError::Unsatisfiable { .. })
            }
            _ => false,
        }
    }
}
