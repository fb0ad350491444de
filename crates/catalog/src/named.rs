//! Name/id handling shared by named entities.

use bikeparts_core::reader::{ObjectReader, bounded_str, identifier};
use bikeparts_core::{Identifier, Scope, Violation};

pub(crate) const NAME_MAX: usize = 200;

/// Read `name` (1..=200 chars) and the optional explicit `id`.
pub(crate) fn read_name_and_id(
    r: &mut ObjectReader<'_>,
) -> (Option<String>, Option<Option<Identifier>>) {
    let name = r.required("name", bounded_str(1, NAME_MAX));
    let id = r.optional("id", identifier);
    (name, id)
}

/// Keep an explicit id, or derive one with `derive`.
///
/// Ids are only inferred when absent, so renaming an entity never changes an
/// id that was already assigned.
pub(crate) fn resolve_id(
    scope: &Scope,
    explicit: Option<Identifier>,
    name: &str,
    derive: impl FnOnce() -> Result<Identifier, String>,
) -> Result<Identifier, Violation> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    let id = derive().map_err(|rule| Violation::invariant(scope.field("id").path(), rule))?;
    tracing::trace!(%id, name, "inferred id from name");
    Ok(id)
}
