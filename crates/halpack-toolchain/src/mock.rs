use crate::backend::{static_library_name, BuildArtifacts, BuildSpec, Toolchain};
use crate::ToolchainError;
use std::fs;
use std::path::Path;

/// Toolchain that fabricates deterministic archives instead of compiling.
///
/// Used by tests and by recipes that set `build.toolchain = "mock"`.
#[derive(Debug, Default)]
pub struct MockToolchain;

impl MockToolchain {
    pub fn new() -> Self {
        Self
    }
}

impl Toolchain for MockToolchain {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn configure_build(&self, spec: &BuildSpec) -> Result<BuildArtifacts, ToolchainError> {
        fs::create_dir_all(&spec.build_dir)?;
        let mut libraries = Vec::with_capacity(spec.libs.len());
        for lib in &spec.libs {
            let path = spec.build_dir.join(static_library_name(lib));
            fs::write(
                &path,
                format!(
                    "mock-archive:{}/{}:{lib}:{}:{}",
                    spec.package,
                    spec.version,
                    spec.settings.build_type,
                    spec.cxx_standard.as_deref().unwrap_or("default")
                ),
            )?;
            libraries.push(path);
        }
        Ok(BuildArtifacts {
            build_dir: spec.build_dir.clone(),
            build_type: spec.settings.build_type,
            libraries,
        })
    }

    fn install(&self, artifacts: &BuildArtifacts, prefix: &Path) -> Result<(), ToolchainError> {
        let lib_dir = prefix.join("lib");
        fs::create_dir_all(&lib_dir)?;
        for library in &artifacts.libraries {
            if !library.is_file() {
                return Err(ToolchainError::ArtifactMissing(library.clone()));
            }
            let Some(file_name) = library.file_name() else {
                return Err(ToolchainError::ArtifactMissing(library.clone()));
            };
            fs::copy(library, lib_dir.join(file_name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::{BuildType, CompilerSettings, OsClass, Settings};

    fn spec(root: &Path) -> BuildSpec {
        BuildSpec {
            package: "libhal-stm32f4".to_owned(),
            version: "0.0.1".to_owned(),
            source_dir: root.to_path_buf(),
            build_dir: root.join("build").join("MinSizeRel"),
            settings: Settings {
                os: OsClass::Baremetal,
                arch: "cortex-m4f".to_owned(),
                build_type: BuildType::MinSizeRel,
                compiler: CompilerSettings {
                    name: "gcc".to_owned(),
                    version: "12.3".to_owned(),
                    cppstd: Some("20".to_owned()),
                },
            },
            cxx_standard: Some("20".to_owned()),
            libs: vec!["libhal-stm32f4".to_owned()],
        }
    }

    #[test]
    fn build_writes_one_archive_per_lib() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = MockToolchain::new().configure_build(&spec(dir.path())).unwrap();
        assert_eq!(artifacts.libraries.len(), 1);
        assert!(artifacts.libraries[0].ends_with("liblibhal-stm32f4.a"));
        assert!(artifacts.libraries[0].is_file());
    }

    #[test]
    fn build_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = MockToolchain::new();
        let first = toolchain.configure_build(&spec(dir.path())).unwrap();
        let a = fs::read(&first.libraries[0]).unwrap();
        let second = toolchain.configure_build(&spec(dir.path())).unwrap();
        let b = fs::read(&second.libraries[0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn install_copies_archives_into_lib() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = MockToolchain::new();
        let artifacts = toolchain.configure_build(&spec(dir.path())).unwrap();
        let prefix = dir.path().join("package");
        toolchain.install(&artifacts, &prefix).unwrap();
        assert!(prefix.join("lib").join("liblibhal-stm32f4.a").is_file());
    }

    #[test]
    fn install_without_build_fails() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = BuildArtifacts::at(
            dir.path().join("build"),
            BuildType::Debug,
            &["libhal-stm32f4".to_owned()],
        );
        let err = MockToolchain::new()
            .install(&artifacts, &dir.path().join("package"))
            .unwrap_err();
        assert!(matches!(err, ToolchainError::ArtifactMissing(_)));
    }
}
