//! Catalog identifiers and name canonicalization.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::Violation;

/// Primary/foreign key of catalog entities: non-empty, `[a-z0-9_]` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

fn is_id_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_')
}

fn strip_non_id_chars(raw: &str) -> String {
    raw.chars().filter(|c| is_id_char(*c)).collect()
}

/// Turn a display name into identifier text.
///
/// Lower-cases, maps spaces, hyphens and periods to `_`, then drops every
/// character outside `[a-z0-9_]`. Total and idempotent; the result may be empty
/// for names without a single usable character.
pub fn canonicalize(name: &str) -> String {
    let lowered = name.to_lowercase().replace([' ', '-', '.'], "_");
    strip_non_id_chars(&lowered)
}

/// Identifier text of a part, namespaced by its manufacturer.
pub fn canonicalize_part_id(manufacturer_id: &Identifier, name: &str) -> String {
    strip_non_id_chars(&format!("{}_{}", manufacturer_id, canonicalize(name)))
}

impl Identifier {
    /// Validate `raw` against `^[a-z0-9_]+$`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err("identifier must not be empty".to_string());
        }
        if let Some(bad) = raw.chars().find(|c| !is_id_char(*c)) {
            return Err(format!(
                "identifier `{raw}` contains `{bad}` (allowed: a-z, 0-9, _)"
            ));
        }
        Ok(Self(raw))
    }

    /// Derive an identifier from a display name.
    pub fn from_name(name: &str) -> Result<Self, String> {
        Self::parse(canonicalize(name))
            .map_err(|_| format!("name `{name}` does not yield a usable identifier"))
    }

    /// Derive a part identifier (`{manufacturer_id}_{name}`).
    pub fn for_part(manufacturer_id: &Identifier, name: &str) -> Result<Self, String> {
        if canonicalize(name).is_empty() {
            return Err(format!("name `{name}` does not yield a usable identifier"));
        }
        Self::parse(canonicalize_part_id(manufacturer_id, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a raw JSON-sourced string, locating failures at `path`.
    pub fn parse_at(path: &str, raw: &str) -> Result<Self, Violation> {
        Self::parse(raw).map_err(|rule| Violation::shape(path, rule))
    }
}

impl core::fmt::Display for Identifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::borrow::Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl FromStr for Identifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
