use crate::config::RecipeConfig;
use crate::linker::linker_directive;
use crate::resolver::resolve_platform;
use halpack_schema::NormalizedRecipe;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What consumers of the package need to know to link against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub cmake_target_name: String,
    pub libs: Vec<String>,
    /// Flags for the consumer's executable link step.
    #[serde(default)]
    pub exelinkflags: Vec<String>,
}

pub fn package_info(
    recipe: &NormalizedRecipe,
    config: &RecipeConfig,
    package_folder: &Path,
) -> PackageInfo {
    let resolution = resolve_platform(&recipe.platform, &config.platform, config.settings.os);
    let exelinkflags = linker_directive(
        resolution,
        &config.platform,
        &recipe.linker_script_namespace,
        package_folder,
    )
    .map(|d| d.flags())
    .unwrap_or_default();

    PackageInfo {
        cmake_target_name: recipe.cmake_target_name.clone(),
        libs: recipe.libs.clone(),
        exelinkflags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::{
        get_preset, parse_recipe_str, BuildType, CompilerSettings, OsClass, PlatformOption,
        Settings,
    };

    fn recipe(preset: &str) -> NormalizedRecipe {
        parse_recipe_str(get_preset(preset).unwrap().recipe)
            .unwrap()
            .normalize()
            .unwrap()
    }

    fn config(os: OsClass, platform: &str) -> RecipeConfig {
        RecipeConfig::new(
            Settings {
                os,
                arch: "cortex-m4f".to_owned(),
                build_type: BuildType::MinSizeRel,
                compiler: CompilerSettings {
                    name: "gcc".to_owned(),
                    version: "12.3".to_owned(),
                    cppstd: Some("20".to_owned()),
                },
            },
            PlatformOption::parse(platform).unwrap(),
        )
    }

    #[test]
    fn bare_metal_listed_platform_gets_linker_flags() {
        let info = package_info(
            &recipe("stm32f4"),
            &config(OsClass::Baremetal, "stm32f411re"),
            Path::new("/p"),
        );
        assert_eq!(info.cmake_target_name, "libhal::stm32f4");
        assert_eq!(info.libs, vec!["libhal-stm32f4".to_owned()]);
        assert_eq!(
            info.exelinkflags,
            vec![
                "-L/p/linker_scripts".to_owned(),
                "-Tlibhal-stm32f4/stm32f411re.ld".to_owned(),
            ]
        );
    }

    #[test]
    fn unlisted_platform_gets_no_flags() {
        let info = package_info(
            &recipe("stm32f4"),
            &config(OsClass::Baremetal, "stm32f446re"),
            Path::new("/p"),
        );
        assert!(info.exelinkflags.is_empty());
        assert_eq!(info.libs, vec!["libhal-stm32f4".to_owned()]);
    }

    #[test]
    fn hosted_os_gets_no_flags() {
        let info = package_info(
            &recipe("stm32f4-profiles"),
            &config(OsClass::Linux, "profile1"),
            Path::new("/p"),
        );
        assert!(info.exelinkflags.is_empty());
    }

    #[test]
    fn profile_platform_flags() {
        let info = package_info(
            &recipe("stm32f4-profiles"),
            &config(OsClass::Baremetal, "profile2"),
            Path::new("/p"),
        );
        assert_eq!(info.exelinkflags[1], "-Tlibhal-stm32f4/profile2.ld");
    }
}
