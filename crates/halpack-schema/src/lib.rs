//! Recipe parsing, normalization, settings, and package identity for halpack.
//!
//! This crate defines the schema layer: TOML recipe parsing (`RecipeV1`), the
//! normalized representation every lifecycle step works from
//! (`NormalizedRecipe`), the dependency requirement table, the `platform`
//! option and its policy, build settings and profiles, deterministic binary
//! package identity (`compute_package_id`), the dependency lock file, and the
//! built-in recipe presets.

pub mod identity;
pub mod lock;
pub mod normalize;
pub mod platform;
pub mod preset;
pub mod recipe;
pub mod requirement;
pub mod settings;
pub mod types;

pub use identity::{compute_package_id, PackageIdentity};
pub use lock::{LockError, LockFile, ResolutionResult, ResolvedDependency, LOCK_FILE_NAME};
pub use normalize::{NormalizedRecipe, PLATFORM_OPTION};
pub use platform::{PlatformError, PlatformOption, PlatformPolicy, PLATFORM_WILDCARD};
pub use preset::{get_preset, list_presets, Preset, BUILTIN_PRESETS};
pub use recipe::{
    parse_recipe_file, parse_recipe_str, BuildSection, OptionsSection, PackageInfoSection,
    PackageSection, PlatformSection, RecipeError, RecipeV1,
};
pub use requirement::{
    parse_lenient_version, DependencyConstraint, RequirementKind, RequirementTable, VersionRange,
};
pub use settings::{
    cppstd_year, parse_profile_file, parse_profile_str, BuildType, CompilerSettings, OsClass,
    Profile, ProfileError, ProfileV1, Settings,
};
pub use types::{PackageId, ShortId};
