//! Dependency constraints and the recipe's requirement table.
//!
//! Ranges use caret-style semantics: `^2.0.1` accepts anything compatible up
//! to the next major version. A bare version such as `3.27.1` is an exact pin.
//! Conan-style brackets (`[^2.0.1]`) and space-separated comparators
//! (`>=1.0 <2.0`) are accepted.

use semver::{Op, Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    raw: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn parse(raw: &str) -> Result<Self, semver::Error> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();
        let req = VersionReq::parse(&to_semver_syntax(inner))?;
        Ok(Self {
            raw: inner.to_owned(),
            req,
        })
    }

    /// The range as written in the recipe, without brackets.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn req(&self) -> &VersionReq {
        &self.req
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// True when the range admits exactly one version.
    pub fn is_pinned(&self) -> bool {
        matches!(
            self.req.comparators.as_slice(),
            [c] if c.op == Op::Exact && c.minor.is_some() && c.patch.is_some()
        )
    }

    /// Lowest version named by the first comparator, if it has a lower bound.
    pub fn floor(&self) -> Option<Version> {
        let first = self.req.comparators.first()?;
        match first.op {
            Op::Exact | Op::Caret | Op::Tilde | Op::GreaterEq | Op::Wildcard => {
                let mut version =
                    Version::new(first.major, first.minor.unwrap_or(0), first.patch.unwrap_or(0));
                version.pre = first.pre.clone();
                Some(version)
            }
            _ => None,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = semver::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(value: VersionRange) -> Self {
        value.raw
    }
}

/// Rewrite recipe range syntax into the comma-separated form `semver` parses.
fn to_semver_syntax(inner: &str) -> String {
    let spaced = inner.replace(',', " ");
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in spaced.split_whitespace() {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending_op.push_str(token);
            continue;
        }
        let token = format!("{pending_op}{token}");
        pending_op.clear();
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            comparators.push(format!("={token}"));
        } else {
            comparators.push(token);
        }
    }
    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }
    comparators.join(", ")
}

/// Parse a compiler-style version (`11`, `14.0`, `14.0.0`) by padding
/// missing components with zero.
pub fn parse_lenient_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let padded = match trimmed.matches('.').count() {
        0 => format!("{trimmed}.0.0"),
        1 => format!("{trimmed}.0"),
        _ => trimmed.to_owned(),
    };
    Version::parse(&padded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Linked into the package; participates in the package identity.
    Requires,
    /// Build-time tool.
    ToolRequires,
    /// Only needed to build and run the package's tests.
    TestRequires,
}

impl RequirementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::ToolRequires => "tool_requires",
            Self::TestRequires => "test_requires",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConstraint {
    pub name: String,
    pub kind: RequirementKind,
    pub range: VersionRange,
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/[{}]", self.name, self.range)
    }
}

/// Static table of declared dependencies, each list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementTable {
    pub requires: Vec<DependencyConstraint>,
    pub tool_requires: Vec<DependencyConstraint>,
    pub test_requires: Vec<DependencyConstraint>,
}

impl RequirementTable {
    pub fn of_kind(&self, kind: RequirementKind) -> &[DependencyConstraint] {
        match kind {
            RequirementKind::Requires => &self.requires,
            RequirementKind::ToolRequires => &self.tool_requires,
            RequirementKind::TestRequires => &self.test_requires,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyConstraint> {
        self.requires
            .iter()
            .chain(&self.tool_requires)
            .chain(&self.test_requires)
    }

    pub fn find(&self, kind: RequirementKind, name: &str) -> Option<&DependencyConstraint> {
        self.of_kind(kind).iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.requires.len() + self.tool_requires.len() + self.test_requires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn caret_range_stops_at_next_major() {
        let range = VersionRange::parse("^2.0.1").unwrap();
        assert!(range.matches(&v("2.0.1")));
        assert!(range.matches(&v("2.9.0")));
        assert!(!range.matches(&v("2.0.0")));
        assert!(!range.matches(&v("3.0.0")));
    }

    #[test]
    fn bracketed_ranges_are_unwrapped() {
        let range = VersionRange::parse("[^3.0.0]").unwrap();
        assert_eq!(range.as_str(), "^3.0.0");
        assert!(range.matches(&v("3.4.1")));
    }

    #[test]
    fn bare_version_is_an_exact_pin() {
        let range = VersionRange::parse("3.27.1").unwrap();
        assert!(range.is_pinned());
        assert!(range.matches(&v("3.27.1")));
        assert!(!range.matches(&v("3.27.2")));
        assert!(!VersionRange::parse("^3.27.1").unwrap().is_pinned());
    }

    #[test]
    fn space_separated_comparators() {
        let range = VersionRange::parse("[>=1.0 <2.0]").unwrap();
        assert!(range.matches(&v("1.5.0")));
        assert!(!range.matches(&v("2.0.0")));

        let spaced_op = VersionRange::parse(">= 1.2, < 1.4").unwrap();
        assert!(spaced_op.matches(&v("1.3.9")));
        assert!(!spaced_op.matches(&v("1.4.0")));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        assert!(VersionRange::parse("^two").is_err());
        assert!(VersionRange::parse("[^2.0.1").is_err());
    }

    #[test]
    fn floor_of_common_ranges() {
        assert_eq!(VersionRange::parse("^2.0.3").unwrap().floor(), Some(v("2.0.3")));
        assert_eq!(VersionRange::parse("1.1.9").unwrap().floor(), Some(v("1.1.9")));
        assert_eq!(VersionRange::parse("<2.0").unwrap().floor(), None);
    }

    #[test]
    fn lenient_versions_pad_missing_components() {
        assert_eq!(parse_lenient_version("11").unwrap(), v("11.0.0"));
        assert_eq!(parse_lenient_version("12.3").unwrap(), v("12.3.0"));
        assert_eq!(parse_lenient_version("14.0.0").unwrap(), v("14.0.0"));
        assert!(parse_lenient_version("twelve").is_err());
    }

    #[test]
    fn constraint_display_uses_reference_syntax() {
        let c = DependencyConstraint {
            name: "libhal".to_owned(),
            kind: RequirementKind::Requires,
            range: VersionRange::parse("^2.0.1").unwrap(),
        };
        assert_eq!(c.to_string(), "libhal/[^2.0.1]");
    }
}
