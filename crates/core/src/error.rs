//! Validation error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the validation layer.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Category of a [`Violation`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Shape,
    Invariant,
    Config,
}

/// A single violated rule, located by its dotted field path.
///
/// The root object has the empty path; nested fields read like
/// `variants[0].listings.bike24.price_tag`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A raw value does not satisfy its declared type, range or pattern.
    #[error("{}: {}", display_path(.path), .rule)]
    Shape { path: String, rule: String },

    /// Individually well-typed fields violate a cross-field rule.
    #[error("{}: invariant violated: {}", display_path(.path), .rule)]
    Invariant { path: String, rule: String },

    /// An authoring mistake in a shop's or catalog's static configuration.
    #[error("{}: config error: {}", display_path(.path), .rule)]
    Config { path: String, rule: String },
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

impl Violation {
    pub fn shape(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            rule: rule.into(),
        }
    }

    pub fn invariant(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Invariant {
            path: path.into(),
            rule: rule.into(),
        }
    }

    pub fn config(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            rule: rule.into(),
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::Shape { .. } => ViolationKind::Shape,
            Violation::Invariant { .. } => ViolationKind::Invariant,
            Violation::Config { .. } => ViolationKind::Config,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Violation::Shape { path, .. }
            | Violation::Invariant { path, .. }
            | Violation::Config { path, .. } => path,
        }
    }

    pub fn rule(&self) -> &str {
        match self {
            Violation::Shape { rule, .. }
            | Violation::Invariant { rule, .. }
            | Violation::Config { rule, .. } => rule,
        }
    }
}

/// Every violation found while constructing one top-level value.
///
/// Never empty: construction is all-or-nothing, so an error always names at
/// least one failing field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {}", render(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Build an error from collected violations.
    ///
    /// Returns `None` when nothing was violated.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Whether any violation of `kind` is present.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind() == kind)
    }

    /// Whether a violation is located exactly at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path() == path)
    }
}

impl From<Violation> for ValidationError {
    fn from(value: Violation) -> Self {
        Self {
            violations: vec![value],
        }
    }
}
