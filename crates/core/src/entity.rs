//! Entity traits: identity plus construct-or-fail validation.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ValidationResult, Violation};
use crate::id::Identifier;
use crate::reader::Scope;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entity identified by an [`Identifier`] usually derived from its display name.
pub trait NamedEntity: Entity<Id = Identifier> {
    fn name(&self) -> &str;
}

/// A type that only exists in validated form.
///
/// `validate_at` is the single construction entry point: it takes an untyped
/// payload and returns either a fully valid value or every violated rule.
/// There is no in-place mutation; [`Validated::with_change`] edits the
/// serialized form and validates it again, so an invalid value is never
/// observable.
pub trait Validated: Sized + Serialize {
    /// Validate `value` located at `scope`.
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self>;

    /// Top-level (exhaustive) construction.
    fn from_value(value: &Value) -> ValidationResult<Self> {
        Self::validate_at(&Scope::root(), value)
    }

    /// The payload this value was (or could have been) built from.
    fn to_value(&self) -> ValidationResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| Violation::shape("", format!("not serializable: {e}")).into())
    }

    /// Apply `change` to the serialized form and validate the result.
    fn with_change(&self, change: impl FnOnce(&mut Value)) -> ValidationResult<Self> {
        let mut value = self.to_value()?;
        change(&mut value);
        Self::from_value(&value)
    }
}
