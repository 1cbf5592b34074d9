//! The `platform` recipe option.
//!
//! [`PlatformOption`] is the validated value a consumer selects (a part number,
//! a board profile, or the `ANY` wildcard). [`PlatformPolicy`] is recipe data:
//! which values are accepted at all and which of them select a linker script.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Wildcard meaning "no specific platform".
pub const PLATFORM_WILDCARD: &str = "ANY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("platform identifier must not be empty")]
    Empty,
    #[error("invalid platform identifier '{0}': only ASCII letters, digits, '.', '-' and '_' are allowed")]
    InvalidCharacters(String),
    #[error("platform '{value}' is not one of the recipe's allowed values: {allowed}")]
    NotAllowed { value: String, allowed: String },
    #[error("the wildcard 'ANY' cannot select a linker script")]
    WildcardScript,
    #[error("linker script platform '{0}' is not in the recipe's allowed values")]
    ScriptNotAllowed(String),
}

/// A syntactically valid platform identifier.
///
/// The identifier is used verbatim as a linker script file name, so it may
/// not contain path separators or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformOption(String);

impl PlatformOption {
    pub fn parse(raw: &str) -> Result<Self, PlatformError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlatformError::Empty);
        }
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid || trimmed.starts_with('.') {
            return Err(PlatformError::InvalidCharacters(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn any() -> Self {
        Self(PLATFORM_WILDCARD.to_owned())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == PLATFORM_WILDCARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlatformOption {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for PlatformOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlatformOption {
    type Error = PlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlatformOption> for String {
    fn from(value: PlatformOption) -> Self {
        value.0
    }
}

/// Recipe-defined rules for the `platform` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPolicy {
    pub default: PlatformOption,
    /// Restricted value domain. `None` means any identifier is accepted.
    pub allowed: Option<BTreeSet<PlatformOption>>,
    /// Identifiers that select a linker script on bare-metal targets.
    pub linker_scripts: BTreeSet<PlatformOption>,
}

impl Default for PlatformPolicy {
    fn default() -> Self {
        Self {
            default: PlatformOption::any(),
            allowed: None,
            linker_scripts: BTreeSet::new(),
        }
    }
}

impl PlatformPolicy {
    /// Build a policy from raw recipe values, checking internal consistency.
    pub fn new(
        default: &str,
        allowed: Option<&[String]>,
        linker_scripts: &[String],
    ) -> Result<Self, PlatformError> {
        let allowed = match allowed {
            Some(values) => Some(
                values
                    .iter()
                    .map(|v| PlatformOption::parse(v))
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            None => None,
        };

        let mut scripts = BTreeSet::new();
        for raw in linker_scripts {
            let platform = PlatformOption::parse(raw)?;
            if platform.is_wildcard() {
                return Err(PlatformError::WildcardScript);
            }
            if let Some(domain) = &allowed {
                if !domain.contains(&platform) {
                    return Err(PlatformError::ScriptNotAllowed(platform.into()));
                }
            }
            scripts.insert(platform);
        }

        let policy = Self {
            default: PlatformOption::any(),
            allowed,
            linker_scripts: scripts,
        };
        let default = policy.accept(default)?;
        Ok(Self { default, ..policy })
    }

    /// Validate a consumer-supplied value against the recipe's domain.
    ///
    /// The wildcard is always accepted.
    pub fn accept(&self, raw: &str) -> Result<PlatformOption, PlatformError> {
        let platform = PlatformOption::parse(raw)?;
        if platform.is_wildcard() {
            return Ok(platform);
        }
        if let Some(domain) = &self.allowed {
            if !domain.contains(&platform) {
                let allowed = domain
                    .iter()
                    .map(PlatformOption::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(PlatformError::NotAllowed {
                    value: platform.into(),
                    allowed,
                });
            }
        }
        Ok(platform)
    }

    pub fn selects_linker_script(&self, platform: &PlatformOption) -> bool {
        self.linker_scripts.contains(platform)
    }

    pub fn is_restricted(&self) -> bool {
        self.allowed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn parses_part_numbers_and_wildcard() {
        assert_eq!(PlatformOption::parse(" stm32f411re ").unwrap().as_str(), "stm32f411re");
        assert!(PlatformOption::parse("ANY").unwrap().is_wildcard());
        assert!(!PlatformOption::parse("any").unwrap().is_wildcard());
    }

    #[test]
    fn rejects_path_like_identifiers() {
        assert_eq!(PlatformOption::parse(""), Err(PlatformError::Empty));
        assert!(PlatformOption::parse("../etc/passwd").is_err());
        assert!(PlatformOption::parse("stm32/f4").is_err());
        assert!(PlatformOption::parse("stm32 f4").is_err());
        assert!(PlatformOption::parse(".hidden").is_err());
    }

    #[test]
    fn open_policy_accepts_unknown_identifiers() {
        let policy = PlatformPolicy::new("ANY", None, &strings(&["stm32f411re"])).unwrap();
        let unknown = policy.accept("stm32f446re").unwrap();
        assert!(!policy.selects_linker_script(&unknown));
        let known = policy.accept("stm32f411re").unwrap();
        assert!(policy.selects_linker_script(&known));
    }

    #[test]
    fn restricted_policy_rejects_values_outside_domain() {
        let policy = PlatformPolicy::new(
            "ANY",
            Some(strings(&["profile1", "profile2", "ANY"]).as_slice()),
            &strings(&["profile1", "profile2"]),
        )
        .unwrap();
        assert!(policy.is_restricted());
        assert!(policy.accept("profile2").is_ok());
        assert!(policy.accept("ANY").is_ok());
        let err = policy.accept("stm32f411re").unwrap_err();
        assert!(matches!(err, PlatformError::NotAllowed { .. }));
    }

    #[test]
    fn script_platforms_must_be_inside_restricted_domain() {
        let err = PlatformPolicy::new(
            "ANY",
            Some(strings(&["profile1"]).as_slice()),
            &strings(&["profile2"]),
        )
        .unwrap_err();
        assert_eq!(err, PlatformError::ScriptNotAllowed("profile2".to_owned()));
    }

    #[test]
    fn wildcard_cannot_select_a_script() {
        let err = PlatformPolicy::new("ANY", None, &strings(&["ANY"])).unwrap_err();
        assert_eq!(err, PlatformError::WildcardScript);
    }

    #[test]
    fn default_must_be_accepted_by_domain() {
        assert!(PlatformPolicy::new("profile3", Some(strings(&["profile1"]).as_slice()), &[]).is_err());
        let policy = PlatformPolicy::new("profile1", Some(strings(&["profile1"]).as_slice()), &[]).unwrap();
        assert_eq!(policy.default.as_str(), "profile1");
    }

    #[test]
    fn duplicate_script_entries_collapse() {
        let policy =
            PlatformPolicy::new("ANY", None, &strings(&["stm32f411re", "stm32f411re"])).unwrap();
        assert_eq!(policy.linker_scripts.len(), 1);
    }
}
