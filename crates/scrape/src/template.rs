//! `{variable}` URL templates.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use bikeparts_core::{Scope, ValidationResult, Violation};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"));

/// A URL suffix with `{name}` placeholders, closed over an allowed variable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

/// Every `{name}` placeholder in `template`.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

impl UrlTemplate {
    /// Check that `template` references at least one variable and only
    /// variables from `allowed`.
    pub fn parse(scope: &Scope, template: &str, allowed: &[&str]) -> ValidationResult<Self> {
        let used = placeholders(template);
        if used.is_empty() {
            return Err(Violation::invariant(
                scope.path(),
                format!("template `{template}` references no variable"),
            )
            .into());
        }
        if let Some(unknown) = used.iter().find(|name| !allowed.contains(&name.as_str())) {
            return Err(Violation::invariant(
                scope.path(),
                format!(
                    "variable `{unknown}` is not allowed here (allowed: {})",
                    allowed.join(", ")
                ),
            )
            .into());
        }
        Ok(Self(template.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn variables(&self) -> BTreeSet<String> {
        placeholders(&self.0)
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, String> {
        let missing: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|name| !values.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing template variables: {}", missing.join(", ")));
        }
        let rendered = PLACEHOLDER.replace_all(&self.0, |caps: &regex::Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}
