//! Hex identifiers of a binary package. Both serialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Full 64-character blake3 hex digest identifying one binary package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

/// First 12 characters of a [`PackageId`], for display and log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl PackageId {
    pub(crate) fn from_digest(hex: String) -> Self {
        Self(hex)
    }

    /// The short form: a prefix of the digest.
    pub fn short(&self) -> ShortId {
        ShortId(self.0.chars().take(12).collect())
    }
}

impl Deref for PackageId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Deref for ShortId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_digest_prefix() {
        let id = PackageId::from_digest("0123456789abcdef".repeat(4));
        assert_eq!(&*id.short(), "0123456789ab");
        assert!(id.starts_with(&*id.short()));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = PackageId::from_digest("deadbeef".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: PackageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(id.to_string(), "deadbeef");
    }
}
