use crate::platform::{PlatformOption, PlatformPolicy};
use crate::recipe::{RecipeError, RecipeV1};
use crate::requirement::{
    parse_lenient_version, DependencyConstraint, RequirementKind, RequirementTable, VersionRange,
};
use crate::settings::cppstd_year;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the only option a recipe declares.
pub const PLATFORM_OPTION: &str = "platform";

/// Canonical, validated representation of a parsed recipe.
///
/// Every version range is parsed, defaults are filled in, and descriptive
/// list fields are trimmed, sorted and deduplicated (`libs` keeps its order). This is the input to identity hashing and
/// every lifecycle operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedRecipe {
    pub recipe_version: u32,
    pub name: String,
    pub version: Version,
    pub license: Option<String>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub platform: PlatformPolicy,
    pub requirements: RequirementTable,
    pub toolchain: String,
    pub min_cppstd: Option<String>,
    pub exports_sources: Vec<String>,
    pub compiler_minimum: BTreeMap<String, Version>,
    pub cmake_target_name: String,
    pub libs: Vec<String>,
    pub linker_script_namespace: String,
}

impl RecipeV1 {
    /// Normalize the recipe: validate fields, parse ranges, resolve defaults.
    pub fn normalize(&self) -> Result<NormalizedRecipe, RecipeError> {
        if self.recipe_version != 1 {
            return Err(RecipeError::UnsupportedVersion(self.recipe_version));
        }

        let name = self.package.name.trim().to_owned();
        if name.is_empty() {
            return Err(RecipeError::EmptyName);
        }
        if !is_valid_package_name(&name) {
            return Err(RecipeError::InvalidName(name));
        }

        let raw_version = self.package.version.trim();
        let version = Version::parse(raw_version).map_err(|source| RecipeError::InvalidVersion {
            version: raw_version.to_owned(),
            source,
        })?;

        let platform_section = &self.options.platform;
        let platform = PlatformPolicy::new(
            &platform_section.default,
            platform_section.allowed.as_deref(),
            &platform_section.linker_scripts,
        )?;

        let requirements = RequirementTable {
            requires: constraints(RequirementKind::Requires, &self.requires)?,
            tool_requires: constraints(RequirementKind::ToolRequires, &self.tool_requires)?,
            test_requires: constraints(RequirementKind::TestRequires, &self.test_requires)?,
        };

        let min_cppstd = match self.build.min_cppstd.as_deref().map(str::trim) {
            Some(std) if cppstd_year(std).is_none() => {
                return Err(RecipeError::InvalidCppStd(std.to_owned()));
            }
            Some(std) => Some(std.to_owned()),
            None => None,
        };

        let mut compiler_minimum = BTreeMap::new();
        for (compiler, floor) in &self.build.compiler_minimum {
            let parsed =
                parse_lenient_version(floor).map_err(|_| RecipeError::InvalidCompilerMinimum {
                    compiler: compiler.clone(),
                    version: floor.clone(),
                })?;
            compiler_minimum.insert(compiler.trim().to_lowercase(), parsed);
        }

        let info = &self.package_info;
        let libs = if info.libs.is_empty() {
            vec![name.clone()]
        } else {
            let libs = ordered_string_list(&info.libs);
            if libs.is_empty() {
                return Err(RecipeError::NoLibraries);
            }
            libs
        };
        let cmake_target_name = non_empty(info.cmake_target_name.as_deref())
            .unwrap_or_else(|| format!("{name}::{name}"));
        let linker_script_namespace =
            non_empty(info.linker_script_namespace.as_deref()).unwrap_or_else(|| name.clone());

        Ok(NormalizedRecipe {
            recipe_version: self.recipe_version,
            version,
            license: non_empty(self.package.license.as_deref()),
            url: non_empty(self.package.url.as_deref()),
            homepage: non_empty(self.package.homepage.as_deref()),
            description: non_empty(self.package.description.as_deref()),
            topics: normalize_string_list(&self.package.topics),
            platform,
            requirements,
            toolchain: self.build.toolchain.trim().to_lowercase(),
            min_cppstd,
            exports_sources: normalize_string_list(&self.build.exports_sources),
            compiler_minimum,
            cmake_target_name,
            libs,
            linker_script_namespace,
            name,
        })
    }
}

impl NormalizedRecipe {
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// `name/version` reference used in logs and lock files.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Pick the platform value out of a consumer's option map.
    ///
    /// Absent means the recipe default. Any option other than `platform` is
    /// rejected, as is a value outside a restricted domain.
    pub fn select_platform(
        &self,
        options: &BTreeMap<String, String>,
    ) -> Result<PlatformOption, RecipeError> {
        if let Some(unknown) = options.keys().find(|k| k.as_str() != PLATFORM_OPTION) {
            return Err(RecipeError::UnknownOption(unknown.clone()));
        }
        match options.get(PLATFORM_OPTION) {
            Some(raw) => Ok(self.platform.accept(raw)?),
            None => Ok(self.platform.default.clone()),
        }
    }
}

fn constraints(
    kind: RequirementKind,
    table: &BTreeMap<String, String>,
) -> Result<Vec<DependencyConstraint>, RecipeError> {
    let mut out = Vec::with_capacity(table.len());
    for (name, range) in table {
        let invalid = |reason: String| RecipeError::InvalidVersionRange {
            kind: kind.as_str(),
            name: name.clone(),
            range: range.clone(),
            reason,
        };
        if range.trim().is_empty() {
            return Err(invalid("empty range".to_owned()));
        }
        let parsed = VersionRange::parse(range).map_err(|e| invalid(e.to_string()))?;
        out.push(DependencyConstraint {
            name: name.trim().to_owned(),
            kind,
            range: parsed,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn is_valid_package_name(name: &str) -> bool {
    name.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn normalize_string_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Trim and drop empties and repeats, keeping declaration order. Link order
/// of static archives depends on it.
fn ordered_string_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_owned());
        }
    }
    out
}
