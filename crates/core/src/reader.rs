//! Field-path scoped reading of untyped JSON payloads.
//!
//! Construction of every validated type starts from a `serde_json::Value` and
//! goes through an [`ObjectReader`]. The reader tracks which keys were consumed
//! (so unknown keys can be rejected) and collects violations according to the
//! scope's collection policy:
//!
//! - the root scope and record scopes are **exhaustive**: every violation is
//!   kept;
//! - every nested scope is **fail-fast**: only the first violation is kept, and
//!   the reader stops parsing once it has one.
//!
//! Lists and keyed maps are not objects of their own: each element is checked
//! in its own fail-fast scope and all element failures are handed to the owner.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult, Violation};
use crate::id::Identifier;

/// Location of a value inside a payload, plus its collection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    path: String,
    fail_fast: bool,
}

impl Scope {
    /// Scope of a top-level construction call.
    pub fn root() -> Self {
        Self {
            path: String::new(),
            fail_fast: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Scope of the field `key` (always fail-fast).
    pub fn field(&self, key: &str) -> Self {
        let path = if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        };
        Self {
            path,
            fail_fast: true,
        }
    }

    /// Scope of the list element at `index` (always fail-fast).
    pub fn index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            fail_fast: true,
        }
    }

    /// Scope of a standalone record at `index` of a batch (exhaustive).
    pub fn record(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            fail_fast: false,
        }
    }
}

/// Violations gathered for one scope.
#[derive(Debug)]
struct Violations {
    fail_fast: bool,
    items: Vec<Violation>,
}

impl Violations {
    pub fn new(scope: &Scope) -> Self {
        Self {
            fail_fast: scope.fail_fast,
            items: Vec::new(),
        }
    }

    /// Whether the scope stopped accepting violations.
    pub fn is_saturated(&self) -> bool {
        self.fail_fast && !self.items.is_empty()
    }

    pub fn push(&mut self, violation: Violation) {
        if !self.is_saturated() {
            self.items.push(violation);
        }
    }

    pub fn absorb(&mut self, error: ValidationError) {
        for violation in error.into_violations() {
            self.push(violation);
        }
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> ValidationResult<()> {
        match ValidationError::from_violations(self.items) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Reads the fields of one JSON object.
pub struct ObjectReader<'a> {
    scope: Scope,
    map: &'a Map<String, Value>,
    consumed: BTreeSet<&'a str>,
    violations: Violations,
}

impl<'a> ObjectReader<'a> {
    /// Open `value` as an object, or fail with a shape violation.
    pub fn open(scope: &Scope, value: &'a Value) -> ValidationResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Violation::shape(scope.path(), "expected an object"))?;
        Ok(Self {
            scope: scope.clone(),
            map,
            consumed: BTreeSet::new(),
            violations: Violations::new(scope),
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn keys(&self) -> Vec<&'a str> {
        let map: &'a Map<String, Value> = self.map;
        map.keys().map(String::as_str).collect()
    }

    /// Raw value of `key`, marking it consumed. `null` reads as absent.
    pub fn raw(&mut self, key: &str) -> Option<&'a Value> {
        let map: &'a Map<String, Value> = self.map;
        let (stored, value) = map.get_key_value(key)?;
        self.consumed.insert(stored.as_str());
        if value.is_null() { None } else { Some(value) }
    }

    pub fn report(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn report_all(&mut self, error: ValidationError) {
        self.violations.absorb(error);
    }

    /// Parse an optional field. Yields `Some(None)` when absent, `None` on failure.
    pub fn optional<T>(
        &mut self,
        key: &str,
        parse: impl FnOnce(&Scope, &'a Value) -> ValidationResult<T>,
    ) -> Option<Option<T>> {
        let value = self.raw(key);
        if self.violations.is_saturated() {
            return None;
        }
        let Some(value) = value else {
            return Some(None);
        };
        match parse(&self.scope.field(key), value) {
            Ok(parsed) => Some(Some(parsed)),
            Err(err) => {
                self.report_all(err);
                None
            }
        }
    }

    /// Parse a required field, reporting a shape violation when it is absent.
    pub fn required<T>(
        &mut self,
        key: &str,
        parse: impl FnOnce(&Scope, &'a Value) -> ValidationResult<T>,
    ) -> Option<T> {
        match self.optional(key, parse)? {
            Some(parsed) => Some(parsed),
            None => {
                let path = self.scope.field(key);
                self.report(Violation::shape(path.path(), "field is required"));
                None
            }
        }
    }

    /// Finish the shape pass: unknown keys become shape violations.
    pub fn finish(mut self) -> ValidationResult<()> {
        let unknown: Vec<&str> = self
            .map
            .keys()
            .map(String::as_str)
            .filter(|key| !self.consumed.contains(key))
            .collect();
        for key in unknown {
            let path = self.scope.field(key);
            self.violations
                .push(Violation::shape(path.path(), "unknown field"));
        }
        self.violations.into_result()
    }
}

/// Deserialize a leaf value with serde, turning failures into a shape violation.
pub fn typed<T: DeserializeOwned>(scope: &Scope, value: &Value) -> ValidationResult<T> {
    T::deserialize(value).map_err(|e| Violation::shape(scope.path(), e.to_string()).into())
}

/// A string of `min..=max` characters.
pub fn bounded_str(
    min: usize,
    max: usize,
) -> impl FnOnce(&Scope, &Value) -> ValidationResult<String> {
    move |scope, value| {
        let text = value
            .as_str()
            .ok_or_else(|| Violation::shape(scope.path(), "expected a string"))?;
        let len = text.chars().count();
        if len < min || len > max {
            return Err(Violation::shape(
                scope.path(),
                format!("length {len} outside {min}..={max}"),
            )
            .into());
        }
        Ok(text.to_string())
    }
}

/// Any non-empty string.
pub fn non_empty_str(scope: &Scope, value: &Value) -> ValidationResult<String> {
    let text = value
        .as_str()
        .ok_or_else(|| Violation::shape(scope.path(), "expected a string"))?;
    if text.is_empty() {
        return Err(Violation::shape(scope.path(), "must not be empty").into());
    }
    Ok(text.to_string())
}

/// A string matching the identifier pattern.
pub fn identifier(scope: &Scope, value: &Value) -> ValidationResult<Identifier> {
    let raw = value
        .as_str()
        .ok_or_else(|| Violation::shape(scope.path(), "expected an identifier string"))?;
    Ok(Identifier::parse_at(scope.path(), raw)?)
}

/// A finite, non-negative number.
pub fn non_negative_f64(scope: &Scope, value: &Value) -> ValidationResult<f64> {
    let number = value
        .as_f64()
        .ok_or_else(|| Violation::shape(scope.path(), "expected a number"))?;
    if !number.is_finite() || number < 0.0 {
        return Err(Violation::shape(scope.path(), "must be a finite number >= 0").into());
    }
    Ok(number)
}

/// An absolute `http`/`https` URL.
pub fn http_url(scope: &Scope, value: &Value) -> ValidationResult<url::Url> {
    let text = value
        .as_str()
        .ok_or_else(|| Violation::shape(scope.path(), "expected a URL string"))?;
    let parsed = url::Url::parse(text)
        .map_err(|e| Violation::shape(scope.path(), format!("invalid URL `{text}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Violation::shape(
            scope.path(),
            format!("URL scheme `{other}` is not http(s)"),
        )
        .into()),
    }
}

/// Run `parse` for every element of a JSON array, each in its own fail-fast scope.
///
/// Every failing element contributes its violations; the owning object's
/// reader decides how many of them it keeps.
pub fn each_element<'a, T>(
    scope: &Scope,
    value: &'a Value,
    mut parse: impl FnMut(&Scope, &'a Value) -> ValidationResult<T>,
) -> ValidationResult<Vec<T>> {
    let items = value
        .as_array()
        .ok_or_else(|| Violation::shape(scope.path(), "expected a list"))?;
    let mut violations = Vec::new();
    let mut parsed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match parse(&scope.index(i), item) {
            Ok(v) => parsed.push(v),
            Err(err) => violations.extend(err.into_violations()),
        }
    }
    match ValidationError::from_violations(violations) {
        Some(err) => Err(err),
        None => Ok(parsed),
    }
}

/// Run `parse` for every entry of a JSON object, each value in its own scope.
pub fn each_entry<'a, T>(
    scope: &Scope,
    value: &'a Value,
    mut parse: impl FnMut(&Scope, &'a str, &'a Value) -> ValidationResult<T>,
) -> ValidationResult<Vec<T>> {
    let entries = value
        .as_object()
        .ok_or_else(|| Violation::shape(scope.path(), "expected an object"))?;
    let mut violations = Vec::new();
    let mut parsed = Vec::with_capacity(entries.len());
    for (key, item) in entries {
        match parse(&scope.field(key), key.as_str(), item) {
            Ok(v) => parsed.push(v),
            Err(err) => violations.extend(err.into_violations()),
        }
    }
    match ValidationError::from_violations(violations) {
        Some(err) => Err(err),
        None => Ok(parsed),
    }
}
