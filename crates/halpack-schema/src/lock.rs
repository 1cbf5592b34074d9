use crate::normalize::NormalizedRecipe;
use crate::requirement::RequirementKind;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const LOCK_FILE_NAME: &str = "halpack.lock";
const LOCK_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lock file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("lock file serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported lock_version {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("lock file hash mismatch: lock has '{lock_hash}', recomputed '{computed_hash}'")]
    HashMismatch {
        lock_hash: String,
        computed_hash: String,
    },
    #[error("lock file recipe drift: {0}")]
    RecipeDrift(String),
}

/// A declared dependency pinned to one concrete version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedDependency {
    pub kind: RequirementKind,
    pub name: String,
    pub version: Version,
}

/// Output of a dependency resolver for one recipe.
#[derive(Debug, Clone, Default)]
pub struct ResolutionResult {
    pub resolved: Vec<ResolvedDependency>,
}

/// The lock file captures the concrete versions chosen for every declared
/// constraint, plus a hash over them so tampering is detectable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockFile {
    pub lock_version: u32,
    pub package: String,
    pub version: String,
    pub lock_hash: String,
    #[serde(default)]
    pub resolved: Vec<ResolvedDependency>,
}

impl LockFile {
    pub fn from_resolved(recipe: &NormalizedRecipe, resolution: &ResolutionResult) -> Self {
        let mut resolved = resolution.resolved.clone();
        resolved.sort();

        let lock = LockFile {
            lock_version: LOCK_VERSION,
            package: recipe.name.clone(),
            version: recipe.version.to_string(),
            lock_hash: String::new(),
            resolved,
        };
        LockFile {
            lock_hash: lock.compute_hash(),
            ..lock
        }
    }

    pub fn compute_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("ref:{}/{}", self.package, self.version).as_bytes());
        for dep in &self.resolved {
            hasher.update(format!("{}:{}@{}", dep.kind, dep.name, dep.version).as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Check that the stored hash matches the locked content.
    pub fn verify_integrity(&self) -> Result<(), LockError> {
        if self.lock_version != LOCK_VERSION {
            return Err(LockError::UnsupportedVersion(self.lock_version));
        }
        let computed_hash = self.compute_hash();
        if self.lock_hash != computed_hash {
            return Err(LockError::HashMismatch {
                lock_hash: self.lock_hash.clone(),
                computed_hash,
            });
        }
        Ok(())
    }

    /// Check that every constraint in the recipe is locked to a version it
    /// accepts, and that the lock holds nothing the recipe no longer declares.
    pub fn verify_recipe_intent(&self, recipe: &NormalizedRecipe) -> Result<(), LockError> {
        if self.package != recipe.name || self.version != recipe.version.to_string() {
            return Err(LockError::RecipeDrift(format!(
                "lock is for '{}/{}', recipe is '{}'",
                self.package,
                self.version,
                recipe.reference()
            )));
        }

        for constraint in recipe.requirements.iter() {
            let locked = self
                .resolved
                .iter()
                .find(|d| d.kind == constraint.kind && d.name == constraint.name)
                .ok_or_else(|| {
                    LockError::RecipeDrift(format!(
                        "{} '{constraint}' is in the recipe but not in the lock file. Run 'halpack lock' to re-resolve.",
                        constraint.kind
                    ))
                })?;
            if !constraint.range.matches(&locked.version) {
                return Err(LockError::RecipeDrift(format!(
                    "locked {}@{} no longer satisfies '{constraint}'",
                    locked.name, locked.version
                )));
            }
        }

        if let Some(extra) = self
            .resolved
            .iter()
            .find(|d| recipe.requirements.find(d.kind, &d.name).is_none())
        {
            return Err(LockError::RecipeDrift(format!(
                "{} '{}' is locked but no longer declared",
                extra.kind, extra.name
            )));
        }

        Ok(())
    }

    pub fn version_of(&self, kind: RequirementKind, name: &str) -> Option<&Version> {
        self.resolved
            .iter()
            .find(|d| d.kind == kind && d.name == name)
            .map(|d| &d.version)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), LockError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| LockError::Io(e.error))?;
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::parse_recipe_str;

    fn sample_recipe() -> NormalizedRecipe {
        parse_recipe_str(
            r#"
recipe_version = 1
[package]
name = "libhal-stm32f4"
version = "0.0.1"
[requires]
libhal = "^2.0.1"
[tool_requires]
cmake = "3.27.1"
"#,
        )
        .unwrap()
        .normalize()
        .unwrap()
    }

    fn dep(kind: RequirementKind, name: &str, version: &str) -> ResolvedDependency {
        ResolvedDependency {
            kind,
            name: name.to_owned(),
            version: Version::parse(version).unwrap(),
        }
    }

    fn sample_resolution() -> ResolutionResult {
        ResolutionResult {
            resolved: vec![
                dep(RequirementKind::ToolRequires, "cmake", "3.27.1"),
                dep(RequirementKind::Requires, "libhal", "2.1.0"),
            ],
        }
    }

    #[test]
    fn lock_roundtrip() {
        let lock = LockFile::from_resolved(&sample_recipe(), &sample_resolution());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        lock.write_to_file(&path).unwrap();
        let loaded = LockFile::read_from_file(&path).unwrap();
        assert_eq!(lock, loaded);
        assert!(loaded.verify_integrity().is_ok());
    }

    #[test]
    fn resolved_entries_are_sorted() {
        let lock = LockFile::from_resolved(&sample_recipe(), &sample_resolution());
        assert_eq!(lock.resolved[0].kind, RequirementKind::Requires);
        assert_eq!(lock.resolved[1].name, "cmake");
    }

    #[test]
    fn integrity_fails_on_tamper() {
        let mut lock = LockFile::from_resolved(&sample_recipe(), &sample_resolution());
        lock.resolved[0].version = Version::parse("2.2.0").unwrap();
        assert!(matches!(
            lock.verify_integrity(),
            Err(LockError::HashMismatch { .. })
        ));
    }

    #[test]
    fn recipe_intent_verified() {
        let recipe = sample_recipe();
        let lock = LockFile::from_resolved(&recipe, &sample_resolution());
        assert!(lock.verify_recipe_intent(&recipe).is_ok());
        assert_eq!(
            lock.version_of(RequirementKind::Requires, "libhal"),
            Some(&Version::parse("2.1.0").unwrap())
        );
    }

    #[test]
    fn drift_detected_when_range_tightens() {
        let lock = LockFile::from_resolved(&sample_recipe(), &sample_resolution());
        let tightened = parse_recipe_str(
            r#"
recipe_version = 1
[package]
name = "libhal-stm32f4"
version = "0.0.1"
[requires]
libhal = "^2.2.0"
[tool_requires]
cmake = "3.27.1"
"#,
        )
        .unwrap()
        .normalize()
        .unwrap();
        assert!(matches!(
            lock.verify_recipe_intent(&tightened),
            Err(LockError::RecipeDrift(_))
        ));
    }

    #[test]
    fn drift_detected_for_missing_and_extra_entries() {
        let recipe = sample_recipe();
        let partial = LockFile::from_resolved(
            &recipe,
            &ResolutionResult {
                resolved: vec![dep(RequirementKind::Requires, "libhal", "2.1.0")],
            },
        );
        assert!(partial.verify_recipe_intent(&recipe).is_err());

        let mut extra = sample_resolution();
        extra
            .resolved
            .push(dep(RequirementKind::TestRequires, "libhal-mock", "2.0.1"));
        let lock = LockFile::from_resolved(&recipe, &extra);
        assert!(lock.verify_recipe_intent(&recipe).is_err());
    }

    #[test]
    fn same_resolution_same_hash() {
        let recipe = sample_recipe();
        let a = LockFile::from_resolved(&recipe, &sample_resolution());
        let b = LockFile::from_resolved(&recipe, &sample_resolution());
        assert_eq!(a.lock_hash, b.lock_hash);
    }
}
