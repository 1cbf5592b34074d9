use crate::normalize::NormalizedRecipe;
use crate::settings::Settings;
use crate::types::{PackageId, ShortId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Deterministic identity of one binary package configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PackageIdentity {
    pub package_id: PackageId,
    pub short_id: ShortId,
}

/// Compute the binary package identity.
///
/// Inputs are the recipe reference, the full settings, the option values the
/// caller considers identity-relevant, and the runtime `requires` ranges.
/// Descriptive metadata, `tool_requires` and `test_requires` never change the
/// produced binary and are not hashed.
///
/// `options` must already be filtered: an option value that does not change
/// the produced artifact must be left out, or equivalent configurations will
/// be cached as separate binaries.
pub fn compute_package_id(
    recipe: &NormalizedRecipe,
    settings: &Settings,
    options: &BTreeMap<String, String>,
) -> PackageIdentity {
    let mut hasher = blake3::Hasher::new();

    hasher.update(format!("ref:{}/{}", recipe.name, recipe.version).as_bytes());

    hasher.update(format!("os:{}", settings.os).as_bytes());
    hasher.update(format!("arch:{}", settings.arch).as_bytes());
    hasher.update(format!("build_type:{}", settings.build_type).as_bytes());
    hasher.update(format!("compiler:{}", settings.compiler.name).as_bytes());
    hasher.update(format!("compiler.version:{}", settings.compiler.version).as_bytes());
    if let Some(cppstd) = &settings.compiler.cppstd {
        hasher.update(format!("compiler.cppstd:{cppstd}").as_bytes());
    }

    // BTreeMap iteration is sorted by key.
    for (key, value) in options {
        hasher.update(format!("option:{key}={value}").as_bytes());
    }

    for req in &recipe.requirements.requires {
        hasher.update(format!("requires:{}/{}", req.name, req.range).as_bytes());
    }

    let package_id = PackageId::from_digest(hasher.finalize().to_hex().to_string());
    PackageIdentity {
        short_id: package_id.short(),
        package_id,
    }
}
