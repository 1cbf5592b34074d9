use crate::CoreError;
use halpack_schema::{cppstd_year, parse_lenient_version, NormalizedRecipe, Settings};
use tracing::warn;

/// Reject settings the recipe cannot be built with.
///
/// Checks the C++ standard floor, then the per-compiler version floor.
pub fn validate_settings(recipe: &NormalizedRecipe, settings: &Settings) -> Result<(), CoreError> {
    check_cppstd(recipe, settings)?;
    check_compiler_version(recipe, settings)
}

/// The standard the build will compile with: the profile's if set, the
/// recipe minimum otherwise.
pub fn effective_cppstd(recipe: &NormalizedRecipe, settings: &Settings) -> Option<String> {
    settings
        .compiler
        .cppstd
        .clone()
        .or_else(|| recipe.min_cppstd.clone())
}

fn check_cppstd(recipe: &NormalizedRecipe, settings: &Settings) -> Result<(), CoreError> {
    let (Some(min), Some(actual)) = (&recipe.min_cppstd, &settings.compiler.cppstd) else {
        return Ok(());
    };
    let required = cppstd_year(min).ok_or_else(|| CoreError::InvalidCppStd(min.clone()))?;
    let have = cppstd_year(actual).ok_or_else(|| CoreError::InvalidCppStd(actual.clone()))?;
    if have < required {
        return Err(CoreError::CppStdTooLow {
            required: min.clone(),
            actual: actual.clone(),
        });
    }
    Ok(())
}

fn check_compiler_version(
    recipe: &NormalizedRecipe,
    settings: &Settings,
) -> Result<(), CoreError> {
    let compiler = &settings.compiler;
    let Some(floor) = recipe.compiler_minimum.get(&compiler.name) else {
        if !recipe.compiler_minimum.is_empty() {
            warn!(
                "{} {} has no known minimum version for {}; assuming it supports C++{}",
                compiler.name,
                compiler.version,
                recipe.name,
                recipe.min_cppstd.as_deref().unwrap_or("?")
            );
        }
        return Ok(());
    };
    let actual = parse_lenient_version(&compiler.version).map_err(|_| {
        CoreError::InvalidCompilerVersion {
            compiler: compiler.name.clone(),
            version: compiler.version.clone(),
        }
    })?;
    if actual < *floor {
        return Err(CoreError::CompilerTooOld {
            compiler: compiler.name.clone(),
            required: floor.to_string(),
            actual: compiler.version.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::{get_preset, parse_recipe_str, BuildType, CompilerSettings, OsClass};

    fn recipe() -> NormalizedRecipe {
        parse_recipe_str(get_preset("stm32f4").unwrap().recipe)
            .unwrap()
            .normalize()
            .unwrap()
    }

    fn settings(name: &str, version: &str, cppstd: Option<&str>) -> Settings {
        Settings {
            os: OsClass::Baremetal,
            arch: "cortex-m4f".to_owned(),
            build_type: BuildType::MinSizeRel,
            compiler: CompilerSettings {
                name: name.to_owned(),
                version: version.to_owned(),
                cppstd: cppstd.map(str::to_owned),
            },
        }
    }

    #[test]
    fn supported_configuration_passes() {
        assert!(validate_settings(&recipe(), &settings("gcc", "12.3", Some("20"))).is_ok());
        assert!(validate_settings(&recipe(), &settings("clang", "16", Some("gnu23"))).is_ok());
        assert!(validate_settings(&recipe(), &settings("apple-clang", "14.0.0", None)).is_ok());
    }

    #[test]
    fn cppstd_below_minimum_is_rejected() {
        let err = validate_settings(&recipe(), &settings("gcc", "12.3", Some("17"))).unwrap_err();
        assert!(matches!(err, CoreError::CppStdTooLow { .. }));
        let err =
            validate_settings(&recipe(), &settings("gcc", "12.3", Some("gnu98"))).unwrap_err();
        assert!(matches!(err, CoreError::CppStdTooLow { .. }));
    }

    #[test]
    fn garbage_cppstd_is_rejected() {
        let err = validate_settings(&recipe(), &settings("gcc", "12.3", Some("latest"))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCppStd(_)));
    }

    #[test]
    fn old_compiler_is_rejected() {
        let err = validate_settings(&recipe(), &settings("gcc", "10.2", None)).unwrap_err();
        assert!(
            matches!(err, CoreError::CompilerTooOld { ref compiler, .. } if compiler == "gcc")
        );
        assert!(validate_settings(&recipe(), &settings("clang", "13", None)).is_err());
    }

    #[test]
    fn unknown_compiler_is_allowed() {
        assert!(validate_settings(&recipe(), &settings("msvc", "193", Some("20"))).is_ok());
    }

    #[test]
    fn unparsable_compiler_version_is_rejected() {
        let err = validate_settings(&recipe(), &settings("gcc", "twelve", None)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCompilerVersion { .. }));
    }

    #[test]
    fn effective_cppstd_falls_back_to_recipe_minimum() {
        let recipe = recipe();
        assert_eq!(
            effective_cppstd(&recipe, &settings("gcc", "12", None)).as_deref(),
            Some("20")
        );
        assert_eq!(
            effective_cppstd(&recipe, &settings("gcc", "12", Some("gnu23"))).as_deref(),
            Some("gnu23")
        );
    }
}
