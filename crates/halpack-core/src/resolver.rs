//! Platform option resolution.
//!
//! Every function here is pure: the same recipe and configuration always
//! produce the same answer, so the identity phase and the packaging-info
//! phase cannot disagree.

use crate::config::RecipeConfig;
use halpack_schema::{
    compute_package_id, NormalizedRecipe, OsClass, PackageIdentity, PlatformOption,
    PlatformPolicy, PLATFORM_OPTION,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformResolution {
    /// A linker script must be handed to consumers.
    pub needs_linker_script: bool,
    /// The platform value must be part of the package identity.
    pub affects_identity: bool,
}

/// Decide what the platform option means for one target.
///
/// Only bare-metal targets use linker scripts, and only for identifiers the
/// recipe lists. Unknown identifiers are not an error; they simply get no
/// linker treatment. A platform value that changes nothing about the linker
/// outcome changes nothing about the package either, so identity follows the
/// linker decision.
pub fn resolve_platform(
    policy: &PlatformPolicy,
    platform: &PlatformOption,
    os: OsClass,
) -> PlatformResolution {
    let needs_linker_script = os.is_bare_metal() && policy.selects_linker_script(platform);
    PlatformResolution {
        needs_linker_script,
        affects_identity: needs_linker_script,
    }
}

/// Option values that belong in the package identity for this configuration.
pub fn identity_options(
    recipe: &NormalizedRecipe,
    config: &RecipeConfig,
) -> BTreeMap<String, String> {
    let resolution = resolve_platform(&recipe.platform, &config.platform, config.settings.os);
    let mut options = BTreeMap::new();
    if resolution.affects_identity {
        options.insert(PLATFORM_OPTION.to_owned(), config.platform.to_string());
    }
    options
}

pub fn package_identity(recipe: &NormalizedRecipe, config: &RecipeConfig) -> PackageIdentity {
    compute_package_id(
        recipe,
        &config.settings,
        &identity_options(recipe, config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::{BuildType, CompilerSettings, Settings};

    fn policy(scripts: &[&str]) -> PlatformPolicy {
        let scripts: Vec<String> = scripts.iter().map(|s| (*s).to_owned()).collect();
        PlatformPolicy::new("ANY", None, &scripts).unwrap()
    }

    fn p(value: &str) -> PlatformOption {
        PlatformOption::parse(value).unwrap()
    }

    #[test]
    fn listed_platform_on_bare_metal_needs_script() {
        let r = resolve_platform(&policy(&["stm32f411re"]), &p("stm32f411re"), OsClass::Baremetal);
        assert!(r.needs_linker_script);
        assert!(r.affects_identity);
    }

    #[test]
    fn unlisted_platforms_never_need_script() {
        let policy = policy(&["stm32f411re"]);
        for value in ["ANY", "stm32f446re", "profile1", "STM32F411RE"] {
            let r = resolve_platform(&policy, &p(value), OsClass::Baremetal);
            assert!(!r.needs_linker_script, "{value} should not need a script");
            assert!(!r.affects_identity);
        }
    }

    #[test]
    fn hosted_os_gates_scripts_off() {
        let policy = policy(&["stm32f411re"]);
        for os in [OsClass::Linux, OsClass::Macos, OsClass::Windows, OsClass::Freebsd] {
            let r = resolve_platform(&policy, &p("stm32f411re"), os);
            assert!(!r.needs_linker_script);
        }
    }

    #[test]
    fn two_identifier_policy() {
        let policy = policy(&["profile1", "profile2"]);
        assert!(resolve_platform(&policy, &p("profile1"), OsClass::Baremetal).needs_linker_script);
        assert!(resolve_platform(&policy, &p("profile2"), OsClass::Baremetal).needs_linker_script);
        assert!(!resolve_platform(&policy, &p("ANY"), OsClass::Baremetal).needs_linker_script);
    }

    #[test]
    fn resolution_is_deterministic() {
        let policy = policy(&["stm32f411re"]);
        let first = resolve_platform(&policy, &p("stm32f411re"), OsClass::Baremetal);
        for _ in 0..100 {
            assert_eq!(
                resolve_platform(&policy, &p("stm32f411re"), OsClass::Baremetal),
                first
            );
        }
    }

    #[test]
    fn identity_options_follow_resolution() {
        let recipe = halpack_schema::parse_recipe_str(
            r#"
recipe_version = 1
[package]
name = "libhal-stm32f4"
version = "0.0.1"
[options.platform]
linker_scripts = ["stm32f411re"]
"#,
        )
        .unwrap()
        .normalize()
        .unwrap();
        let settings = Settings {
            os: OsClass::Baremetal,
            arch: "cortex-m4f".to_owned(),
            build_type: BuildType::MinSizeRel,
            compiler: CompilerSettings {
                name: "gcc".to_owned(),
                version: "12.3".to_owned(),
                cppstd: None,
            },
        };

        let scripted = RecipeConfig::new(settings.clone(), p("stm32f411re"));
        assert_eq!(
            identity_options(&recipe, &scripted).get("platform").map(String::as_str),
            Some("stm32f411re")
        );

        let unlisted = RecipeConfig::new(settings, p("stm32f446re"));
        assert!(identity_options(&recipe, &unlisted).is_empty());
    }
}
