use crate::CoreError;
use halpack_toolchain::BuildArtifacts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const BUILD_RECORD_FILE: &str = "halpack-build.json";

/// Where a configuration is in the create pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loaded,
    Validated,
    Built,
    Packaged,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loaded => "loaded",
            Self::Validated => "validated",
            Self::Built => "built",
            Self::Packaged => "packaged",
        };
        f.write_str(s)
    }
}

pub fn validate_transition(from: Phase, to: Phase) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (
            Phase::Loaded | Phase::Validated | Phase::Built | Phase::Packaged,
            Phase::Validated
        ) | (Phase::Validated | Phase::Built | Phase::Packaged, Phase::Built)
            | (Phase::Built | Phase::Packaged, Phase::Packaged)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Phase a build tree has reached, and for which package id.
///
/// Written into the build folder so a later `package` call can tell whether
/// the outputs there belong to the configuration being packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub package_id: String,
    pub phase: Phase,
    pub artifacts: BuildArtifacts,
}

impl BuildRecord {
    /// The record in `build_dir`, if one exists.
    pub fn read(build_dir: &Path) -> Result<Option<Self>, CoreError> {
        let path = build_dir.join(BUILD_RECORD_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Phase reached by `package_id`; `Loaded` when the tree holds nothing
    /// for it.
    pub fn phase_of(record: Option<&Self>, package_id: &str) -> Phase {
        record
            .filter(|r| r.package_id == package_id)
            .map_or(Phase::Loaded, |r| r.phase)
    }

    /// Move to `next` and persist, if the transition is allowed.
    pub fn advance(mut self, next: Phase, build_dir: &Path) -> Result<Self, CoreError> {
        validate_transition(self.phase, next)?;
        self.phase = next;
        self.write(build_dir)?;
        Ok(self)
    }

    pub fn write(&self, build_dir: &Path) -> Result<(), CoreError> {
        fs::create_dir_all(build_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(build_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(build_dir.join(BUILD_RECORD_FILE))
            .map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::BuildType;

    fn record(phase: Phase) -> BuildRecord {
        BuildRecord {
            package_id: "abc".to_owned(),
            phase,
            artifacts: BuildArtifacts::at("/b", BuildType::Release, &["x".to_owned()]),
        }
    }

    #[test]
    fn valid_transitions() {
        assert!(validate_transition(Phase::Loaded, Phase::Validated).is_ok());
        assert!(validate_transition(Phase::Validated, Phase::Built).is_ok());
        assert!(validate_transition(Phase::Built, Phase::Packaged).is_ok());
        assert!(validate_transition(Phase::Built, Phase::Built).is_ok()); // rebuild
        assert!(validate_transition(Phase::Packaged, Phase::Packaged).is_ok()); // repackage
        assert!(validate_transition(Phase::Packaged, Phase::Validated).is_ok());
    }

    #[test]
    fn invalid_transitions() {
        assert!(validate_transition(Phase::Loaded, Phase::Built).is_err());
        assert!(validate_transition(Phase::Loaded, Phase::Packaged).is_err());
        assert!(validate_transition(Phase::Validated, Phase::Packaged).is_err());
        assert!(validate_transition(Phase::Built, Phase::Loaded).is_err());
    }

    #[test]
    fn phase_of_other_package_is_loaded() {
        let built = record(Phase::Built);
        assert_eq!(BuildRecord::phase_of(Some(&built), "abc"), Phase::Built);
        assert_eq!(BuildRecord::phase_of(Some(&built), "def"), Phase::Loaded);
        assert_eq!(BuildRecord::phase_of(None, "abc"), Phase::Loaded);
    }

    #[test]
    fn advance_persists_and_rejects_skips() {
        let dir = tempfile::tempdir().unwrap();
        let packaged = record(Phase::Built)
            .advance(Phase::Packaged, dir.path())
            .unwrap();
        assert_eq!(
            BuildRecord::read(dir.path()).unwrap(),
            Some(packaged.clone())
        );

        let err = record(Phase::Loaded)
            .advance(Phase::Packaged, dir.path())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(BuildRecord::read(dir.path()).unwrap(), Some(packaged));
    }

    #[test]
    fn missing_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(BuildRecord::read(dir.path()).unwrap(), None);
    }
}
