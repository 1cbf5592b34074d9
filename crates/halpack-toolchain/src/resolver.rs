use crate::ToolchainError;
use halpack_schema::{DependencyConstraint, ResolutionResult, ResolvedDependency};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Turns declared constraints into concrete versions.
///
/// Implementations never relax a constraint: every returned version satisfies
/// its range, and a constraint nothing satisfies is an error.
pub trait DependencyResolver {
    fn name(&self) -> &str;

    fn resolve(
        &self,
        constraints: &[DependencyConstraint],
    ) -> Result<ResolutionResult, ToolchainError>;
}

/// Resolves every constraint to the lowest version its range names.
///
/// Needs no index, so it is deterministic and works offline.
#[derive(Debug, Default)]
pub struct FloorResolver;

impl DependencyResolver for FloorResolver {
    fn name(&self) -> &'static str {
        "floor"
    }

    fn resolve(
        &self,
        constraints: &[DependencyConstraint],
    ) -> Result<ResolutionResult, ToolchainError> {
        let mut resolved = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let version = constraint
                .range
                .floor()
                .filter(|v| constraint.range.matches(v))
                .ok_or_else(|| unsatisfiable(constraint))?;
            resolved.push(ResolvedDependency {
                kind: constraint.kind,
                name: constraint.name.clone(),
                version,
            });
        }
        Ok(ResolutionResult { resolved })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexFile {
    #[serde(default)]
    packages: BTreeMap<String, Vec<Version>>,
}

/// A local package index listing the published versions of each package.
///
/// ```toml
/// [packages]
/// libhal = ["2.0.1", "2.1.0", "3.0.0"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    packages: BTreeMap<String, Vec<Version>>,
}

impl LocalIndex {
    pub fn new(packages: BTreeMap<String, Vec<Version>>) -> Self {
        Self { packages }
    }

    pub fn parse(input: &str) -> Result<Self, ToolchainError> {
        let file: IndexFile = toml::from_str(input)?;
        Ok(Self::new(file.packages))
    }

    pub fn load(path: &Path) -> Result<Self, ToolchainError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn versions(&self, name: &str) -> &[Version] {
        self.packages.get(name).map_or(&[], Vec::as_slice)
    }
}

impl DependencyResolver for LocalIndex {
    fn name(&self) -> &'static str {
        "index"
    }

    fn resolve(
        &self,
        constraints: &[DependencyConstraint],
    ) -> Result<ResolutionResult, ToolchainError> {
        let mut resolved = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            let version = self
                .versions(&constraint.name)
                .iter()
                .filter(|v| constraint.range.matches(v))
                .max()
                .cloned()
                .ok_or_else(|| unsatisfiable(constraint))?;
            debug!("resolved {constraint} -> {version}");
            resolved.push(ResolvedDependency {
                kind: constraint.kind,
                name: constraint.name.clone(),
                version,
            });
        }
        Ok(ResolutionResult { resolved })
    }
}

fn unsatisfiable(constraint: &DependencyConstraint) -> ToolchainError {
    ToolchainError::Unsatisfiable {
        name: constraint.name.clone(),
        range: constraint.range.to_string(),
    }
}

/// Local index when a path is given, floor resolution otherwise.
pub fn select_resolver(index: Option<&Path>) -> Result<Box<dyn DependencyResolver>, ToolchainError> {
    match index {
        Some(path) => Ok(Box::new(LocalIndex::load(path)?)),
        None => Ok(Box::new(FloorResolver)),
    }
}
