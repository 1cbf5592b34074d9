use crate::CoreError;
use halpack_schema::{NormalizedRecipe, PlatformOption, Profile, Settings};
use serde::Serialize;

/// The complete, immutable input to every lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeConfig {
    pub settings: Settings,
    pub platform: PlatformOption,
}

impl RecipeConfig {
    pub fn new(settings: Settings, platform: PlatformOption) -> Self {
        Self { settings, platform }
    }

    /// Take settings from the profile and check its option values against
    /// the recipe's declared options.
    pub fn from_profile(recipe: &NormalizedRecipe, profile: &Profile) -> Result<Self, CoreError> {
        let platform = recipe.select_platform(&profile.options)?;
        Ok(Self::new(profile.settings.clone(), platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halpack_schema::{get_preset, parse_profile_str, parse_recipe_str, RecipeError};

    fn recipe(preset: &str) -> NormalizedRecipe {
        parse_recipe_str(get_preset(preset).unwrap().recipe)
            .unwrap()
            .normalize()
            .unwrap()
    }

    fn profile(options: &str) -> Profile {
        parse_profile_str(&format!(
            r#"
[settings]
os = "baremetal"
arch = "cortex-m4f"
build_type = "MinSizeRel"
[settings.compiler]
name = "gcc"
version = "12.3"
{options}"#
        ))
        .unwrap()
        .resolve()
        .unwrap()
    }

    #[test]
    fn platform_defaults_to_wildcard() {
        let config = RecipeConfig::from_profile(&recipe("stm32f4"), &profile("")).unwrap();
        assert!(config.platform.is_wildcard());
    }

    #[test]
    fn open_domain_accepts_any_part_number() {
        let config = RecipeConfig::from_profile(
            &recipe("stm32f4"),
            &profile("[options]\nplatform = \"stm32f446re\"\n"),
        )
        .unwrap();
        assert_eq!(config.platform.as_str(), "stm32f446re");
    }

    #[test]
    fn restricted_domain_rejects_part_number() {
        let err = RecipeConfig::from_profile(
            &recipe("stm32f4-profiles"),
            &profile("[options]\nplatform = \"stm32f411re\"\n"),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Recipe(RecipeError::Platform(_))));
        assert!(err.is_configuration_error());
    }
}
