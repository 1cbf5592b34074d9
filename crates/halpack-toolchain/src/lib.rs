//! External collaborators of a halpack recipe.
//!
//! This crate holds the boundary to everything halpack invokes but does not
//! implement: the pluggable `Toolchain` trait with a CMake backend and a mock
//! backend, the `DependencyResolver` trait with a local package index and a
//! floor-version resolver, and prerequisite checks for the host tools.

pub mod backend;
pub mod cmake;
pub mod mock;
pub mod prereq;
pub mod resolver;

pub use backend::{select_toolchain, static_library_name, BuildArtifacts, BuildSpec, Toolchain};
pub use cmake::CmakeToolchain;
pub use mock::MockToolchain;
pub use prereq::{check_toolchain_prereqs, format_missing, MissingPrereq};
pub use resolver::{select_resolver, DependencyResolver, FloorResolver, LocalIndex};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("toolchain I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toolchain '{0}' is not available on this system")]
    Unavailable(String),
    #[error("failed to launch {tool}: {reason}")]
    ExecFailed { tool: String, reason: String },
    #[error("{tool} failed ({status})")]
    ToolFailed { tool: String, status: String },
    #[error("expected build artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),
    #[error("no version of '{name}' satisfies '{range}'")]
    Unsatisfiable { name: String, range: String },
    #[error("invalid package index: {0}")]
    Index(#[from] toml::de::Error),
}
