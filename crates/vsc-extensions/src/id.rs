//! `publisher.package` identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An extension's unique id, `publisher.package`.
///
/// Both halves are non-empty and made of ASCII alphanumerics, `-` or `_`.
/// Comparison is exact; the marketplace itself is case-insensitive but the
/// registry lookup is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Parse and validate an id
    pub fn parse(id: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let (publisher, package) = id
            .split_once('.')
            .ok_or_else(|| invalid("expected <publisher>.<package>"))?;

        for (part, label) in [(publisher, "publisher"), (package, "package")] {
            if part.is_empty() {
                return Err(invalid(&format!("{label} is empty")));
            }
            if !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(invalid(&format!(
                    "{label} may only contain letters, digits, '-' or '_'"
                )));
            }
        }

        Ok(Self(id.to_string()))
    }

    /// Build an id from its two halves
    pub fn from_parts(publisher: &str, package: &str) -> Result<Self> {
        Self::parse(&format!("{publisher}.{package}"))
    }

    /// The publisher half
    pub fn publisher(&self) -> &str {
        self.0.split_once('.').map(|(p, _)| p).unwrap_or(&self.0)
    }

    /// The package half
    pub fn package(&self) -> &str {
        self.0.split_once('.').map(|(_, p)| p).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split `publisher.package[@release]` into the id and an optional release.
pub fn parse_pinned(requested: &str) -> Result<(ExtensionId, Option<String>)> {
    match requested.split_once('@') {
        Some((id, release)) if !release.is_empty() => {
            Ok((ExtensionId::parse(id)?, Some(release.to_string())))
        }
        Some(_) => Err(Error::InvalidId {
            id: requested.to_string(),
            reason: "empty release after '@'".to_string(),
        }),
        None => Ok((ExtensionId::parse(requested)?, None)),
    }
}

impl FromStr for ExtensionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.0
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
