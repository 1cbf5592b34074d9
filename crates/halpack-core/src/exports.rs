//! Check of the recipe's `exports_sources` against the source tree.
//!
//! A plain entry (`LICENSE`, `CMakeLists.txt`) names a file or directory the
//! build cannot do without, so its absence stops the build. A wildcard entry
//! (`src/*`) only warns when it matches nothing.

use crate::CoreError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

/// Directory a wildcard entry expands under: the components before the first
/// one that holds a wildcard.
fn pattern_base(entry: &str) -> PathBuf {
    Path::new(entry)
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !is_pattern(&part.to_string_lossy()),
            _ => true,
        })
        .collect()
}

fn has_entries(dir: &Path) -> Result<bool, CoreError> {
    if !dir.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}

/// Verify every exported source entry against `root`.
///
/// Returns the number of entries that matched.
pub fn check_exported_sources(root: &Path, exports: &[String]) -> Result<usize, CoreError> {
    let mut matched = 0;
    for entry in exports {
        if is_pattern(entry) {
            let base = root.join(pattern_base(entry));
            if has_entries(&base)? {
                matched += 1;
            } else {
                warn!("exports_sources pattern '{entry}' matches nothing");
            }
        } else {
            let path = root.join(entry);
            if !path.exists() {
                return Err(CoreError::MissingSource(path));
            }
            matched += 1;
        }
    }
    debug!("{matched} of {} exported source entries present", exports.len());
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exports(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| (*e).to_owned()).collect()
    }

    #[test]
    fn pattern_base_stops_at_wildcard() {
        assert_eq!(pattern_base("include/*"), PathBuf::from("include"));
        assert_eq!(pattern_base("src/**/*.cpp"), PathBuf::from("src"));
        assert_eq!(pattern_base("*"), PathBuf::new());
    }

    #[test]
    fn present_entries_pass() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), "project(x)").unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/pin.cpp"), "").unwrap();

        let n = check_exported_sources(
            dir.path(),
            &exports(&["LICENSE", "CMakeLists.txt", "src/*"]),
        )
        .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn missing_plain_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        let err =
            check_exported_sources(dir.path(), &exports(&["LICENSE", "CMakeLists.txt"]))
                .unwrap_err();
        assert!(matches!(err, CoreError::MissingSource(p) if p.ends_with("CMakeLists.txt")));
    }

    #[test]
    fn empty_pattern_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        let n = check_exported_sources(dir.path(), &exports(&["tests/*", "src/*"])).unwrap();
        assert_eq!(n, 0);
    }
}
