//! Assembly of the installed package tree.
//!
//! The copy is planned in full before any file is written, so a missing
//! source fails without leaving a half-populated package folder. Files whose
//! destination already holds identical bytes are left untouched, which makes
//! repeated packaging idempotent.

use crate::layout::{PackageLayout, SourceLayout};
use crate::CoreError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];
const LINKER_SCRIPT_EXTENSIONS: &[&str] = &["ld"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    /// Destination paths relative to the package folder, in copy order.
    pub files: Vec<PathBuf>,
    pub copied: usize,
    pub unchanged: usize,
}

struct PlannedCopy {
    src: PathBuf,
    dst: PathBuf,
    relative: PathBuf,
}

/// Copy license, headers and, when required, linker scripts into the
/// package folder.
pub fn package_files(
    source: &SourceLayout,
    package: &PackageLayout,
    with_linker_scripts: bool,
) -> Result<PackageReport, CoreError> {
    let plan = plan_copies(source, package, with_linker_scripts)?;
    let mut report = PackageReport::default();

    for step in plan {
        if same_content(&step.src, &step.dst)? {
            debug!("unchanged: {}", step.relative.display());
            report.unchanged += 1;
        } else {
            if let Some(parent) = step.dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&step.src, &step.dst)?;
            debug!("copied: {}", step.relative.display());
            report.copied += 1;
        }
        report.files.push(step.relative);
    }

    Ok(report)
}

fn plan_copies(
    source: &SourceLayout,
    package: &PackageLayout,
    with_linker_scripts: bool,
) -> Result<Vec<PlannedCopy>, CoreError> {
    let mut plan = Vec::new();

    let license = source.license_file();
    if !license.is_file() {
        return Err(CoreError::MissingSource(license));
    }
    plan.push(PlannedCopy {
        dst: package.licenses_dir().join("LICENSE"),
        relative: Path::new("licenses").join("LICENSE"),
        src: license,
    });

    plan_tree(
        &source.include_dir(),
        &package.include_dir(),
        Path::new("include"),
        HEADER_EXTENSIONS,
        &mut plan,
    )?;

    if with_linker_scripts {
        plan_tree(
            &source.linker_scripts_dir(),
            &package.linker_scripts_dir(),
            Path::new("linker_scripts"),
            LINKER_SCRIPT_EXTENSIONS,
            &mut plan,
        )?;
    }

    Ok(plan)
}

fn plan_tree(
    src_root: &Path,
    dst_root: &Path,
    relative_root: &Path,
    extensions: &[&str],
    plan: &mut Vec<PlannedCopy>,
) -> Result<(), CoreError> {
    if !src_root.is_dir() {
        return Err(CoreError::MissingSource(src_root.to_path_buf()));
    }
    let mut matched = Vec::new();
    collect_matching(src_root, Path::new(""), extensions, &mut matched)?;
    for rel in matched {
        plan.push(PlannedCopy {
            src: src_root.join(&rel),
            dst: dst_root.join(&rel),
            relative: relative_root.join(&rel),
        });
    }
    Ok(())
}

fn collect_matching(
    dir: &Path,
    rel: &Path,
    extensions: &[&str],
    out: &mut Vec<PathBuf>,
) -> Result<(), CoreError> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let rel_path = rel.join(entry.file_name());
        if path.is_dir() {
            collect_matching(&path, &rel_path, extensions, out)?;
        } else if has_extension(&path, extensions) {
            out.push(rel_path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}

fn same_content(src: &Path, dst: &Path) -> Result<bool, CoreError> {
    if !dst.is_file() {
        return Ok(false);
    }
    if fs::metadata(src)?.len() != fs::metadata(dst)?.len() {
        return Ok(false);
    }
    Ok(fs::read(src)? == fs::read(dst)?)
}
