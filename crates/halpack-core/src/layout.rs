use halpack_schema::{BuildType, LOCK_FILE_NAME};
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "halpack-package.json";

/// Paths inside a recipe's source tree.
///
/// The tree is rooted at the directory holding the recipe file. Build trees
/// are kept per build type so switching between them never reuses a stale
/// CMake cache.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn license_file(&self) -> PathBuf {
        self.root.join("LICENSE")
    }

    #[inline]
    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    #[inline]
    pub fn linker_scripts_dir(&self) -> PathBuf {
        self.root.join("linker_scripts")
    }

    #[inline]
    pub fn build_root(&self) -> PathBuf {
        self.root.join("build")
    }

    #[inline]
    pub fn build_dir(&self, build_type: BuildType) -> PathBuf {
        self.build_root().join(build_type.as_str())
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }
}

/// Paths inside an installed binary package.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn licenses_dir(&self) -> PathBuf {
        self.root.join("licenses")
    }

    #[inline]
    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    #[inline]
    pub fn linker_scripts_dir(&self) -> PathBuf {
        self.root.join("linker_scripts")
    }

    #[inline]
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    #[inline]
    pub fn metadata_file(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_dirs_are_split_by_build_type() {
        let layout = SourceLayout::new("/src/libhal-stm32f4");
        assert_eq!(
            layout.build_dir(BuildType::MinSizeRel),
            Path::new("/src/libhal-stm32f4/build/MinSizeRel")
        );
        assert_ne!(
            layout.build_dir(BuildType::Debug),
            layout.build_dir(BuildType::Release)
        );
    }

    #[test]
    fn lock_file_sits_next_to_recipe() {
        let layout = SourceLayout::new("/src/pkg");
        assert_eq!(layout.lock_file(), Path::new("/src/pkg/halpack.lock"));
    }

    #[test]
    fn package_layout_paths() {
        let layout = PackageLayout::new("/pkg");
        assert_eq!(layout.licenses_dir(), Path::new("/pkg/licenses"));
        assert_eq!(layout.linker_scripts_dir(), Path::new("/pkg/linker_scripts"));
        assert_eq!(layout.metadata_file(), Path::new("/pkg/halpack-package.json"));
    }
}
