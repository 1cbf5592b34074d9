use crate::backend::{static_library_name, BuildArtifacts, BuildSpec, Toolchain};
use crate::prereq::{command_exists, compiler_driver};
use crate::ToolchainError;
use halpack_schema::OsClass;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Drives an out-of-source CMake build: configure, build, install.
pub struct CmakeToolchain {
    program: String,
}

impl Default for CmakeToolchain {
    fn default() -> Self {
        Self {
            program: "cmake".to_owned(),
        }
    }
}

impl CmakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `cmake` executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<(), ToolchainError> {
        debug!("{} {}", self.program, args.join(" "));
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| ToolchainError::ExecFailed {
                tool: self.program.clone(),
                reason: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolchainError::ToolFailed {
                tool: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Arguments for the configure step.
///
/// The compiler is always the driver the prerequisite check looked for, so
/// the archive matches the settings the package id was computed from.
pub fn configure_args(spec: &BuildSpec) -> Vec<String> {
    let settings = &spec.settings;
    let mut args = vec![
        "-S".to_owned(),
        spec.source_dir.to_string_lossy().into_owned(),
        "-B".to_owned(),
        spec.build_dir.to_string_lossy().into_owned(),
        format!("-DCMAKE_BUILD_TYPE={}", settings.build_type),
        format!(
            "-DCMAKE_CXX_COMPILER={}",
            compiler_driver(&settings.compiler, settings.os)
        ),
    ];
    if settings.os == OsClass::Baremetal {
        // No OS to link test executables against.
        args.push("-DCMAKE_SYSTEM_NAME=Generic".to_owned());
        args.push(format!("-DCMAKE_SYSTEM_PROCESSOR={}", settings.arch));
        args.push("-DCMAKE_TRY_COMPILE_TARGET_TYPE=STATIC_LIBRARY".to_owned());
    }
    if let Some(std) = &spec.cxx_standard {
        let (extensions, number) = match std.strip_prefix("gnu") {
            Some(number) => ("ON", number),
            None => ("OFF", std.as_str()),
        };
        args.push(format!("-DCMAKE_CXX_STANDARD={number}"));
        args.push("-DCMAKE_CXX_STANDARD_REQUIRED=ON".to_owned());
        args.push(format!("-DCMAKE_CXX_EXTENSIONS={extensions}"));
    }
    args
}

fn find_library(dir: &Path, file_name: &str) -> Result<Option<PathBuf>, ToolchainError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(found) = find_library(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|n| n == file_name) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

impl Toolchain for CmakeToolchain {
    fn name(&self) -> &'static str {
        "cmake"
    }

    fn available(&self) -> bool {
        command_exists(&self.program)
    }

    fn configure_build(&self, spec: &BuildSpec) -> Result<BuildArtifacts, ToolchainError> {
        if !self.available() {
            return Err(ToolchainError::Unavailable(self.program.clone()));
        }
        fs::create_dir_all(&spec.build_dir)?;

        info!("configuring {} in {}", spec.package, spec.build_dir.display());
        self.run(&configure_args(spec))?;

        info!("building {} ({})", spec.package, spec.settings.build_type);
        self.run(&[
            "--build".to_owned(),
            spec.build_dir.to_string_lossy().into_owned(),
            "--config".to_owned(),
            spec.settings.build_type.to_string(),
        ])?;

        let mut libraries = Vec::with_capacity(spec.libs.len());
        for lib in &spec.libs {
            let file_name = static_library_name(lib);
            let found = find_library(&spec.build_dir, &file_name)?
                .ok_or_else(|| ToolchainError::ArtifactMissing(spec.build_dir.join(&file_name)))?;
            libraries.push(found);
        }

        Ok(BuildArtifacts {
            build_dir: spec.build_dir.clone(),
            build_type: spec.settings.build_type,
            libraries,
        })
    }

    fn install(&self, artifacts: &BuildArtifacts, prefix: &Path) -> Result<(), ToolchainError> {
        info!("installing into {}", prefix.display());
        self.run(&[
            "--install".to_owned(),
            artifacts.build_dir.to_string_lossy().into_owned(),
            "--prefix".to_owned(),
            prefix.to_string_lossy().into_owned(),
            "--config".to_owned(),
            artifacts.build_type.to_string(),
        ])
    }
}
