use crate::resolver::PlatformResolution;
use halpack_schema::PlatformOption;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory inside a package folder that holds the linker scripts.
pub const LINKER_SCRIPTS_DIR: &str = "linker_scripts";

/// Instructions a consuming link step needs to pick up a platform's script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkerDirective {
    pub search_path: PathBuf,
    /// Script path relative to `search_path`, `<namespace>/<platform>.ld`.
    pub script: String,
}

impl LinkerDirective {
    pub fn search_flag(&self) -> String {
        format!("-L{}", self.search_path.display())
    }

    pub fn script_flag(&self) -> String {
        format!("-T{}", self.script)
    }

    /// Search-path flag first, then the script flag.
    pub fn flags(&self) -> Vec<String> {
        vec![self.search_flag(), self.script_flag()]
    }
}

/// Linker directive for a resolved platform, if it needs one.
///
/// Whether the script file actually exists is not checked here; a missing
/// script surfaces at the consumer's link step.
pub fn linker_directive(
    resolution: PlatformResolution,
    platform: &PlatformOption,
    namespace: &str,
    package_folder: &Path,
) -> Option<LinkerDirective> {
    if !resolution.needs_linker_script {
        return None;
    }
    Some(LinkerDirective {
        search_path: package_folder.join(LINKER_SCRIPTS_DIR),
        script: format!("{namespace}/{platform}.ld"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEEDED: PlatformResolution = PlatformResolution {
        needs_linker_script: true,
        affects_identity: true,
    };
    const NOT_NEEDED: PlatformResolution = PlatformResolution {
        needs_linker_script: false,
        affects_identity: false,
    };

    #[test]
    fn emits_search_path_then_script() {
        let directive = linker_directive(
            NEEDED,
            &PlatformOption::parse("stm32f411re").unwrap(),
            "libhal-stm32f4",
            Path::new("/pkgs/libhal-stm32f4/p"),
        )
        .unwrap();
        assert_eq!(
            directive.flags(),
            vec![
                "-L/pkgs/libhal-stm32f4/p/linker_scripts".to_owned(),
                "-Tlibhal-stm32f4/stm32f411re.ld".to_owned(),
            ]
        );
    }

    #[test]
    fn nothing_when_not_needed() {
        assert!(linker_directive(
            NOT_NEEDED,
            &PlatformOption::any(),
            "libhal-stm32f4",
            Path::new("/pkgs/p"),
        )
        .is_none());
    }

    #[test]
    fn missing_script_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let directive = linker_directive(
            NEEDED,
            &PlatformOption::parse("profile2").unwrap(),
            "libhal-stm32f4",
            dir.path(),
        )
        .unwrap();
        assert!(!directive.search_path.join(&directive.script).exists());
        assert_eq!(directive.script_flag(), "-Tlibhal-stm32f4/profile2.ld");
    }
}
