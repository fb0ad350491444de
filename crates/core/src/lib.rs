//! `bikeparts-core`: validation building blocks for the bike-parts catalog.
//!
//! This crate contains **pure** primitives (no IO): identifiers and their
//! canonicalization, the violation taxonomy, field-path scoped object readers and
//! the price value objects shared by listings and scrape results.

pub mod entity;
pub mod error;
pub mod id;
pub mod price;
pub mod reader;
pub mod value_object;

pub use entity::{Entity, NamedEntity, Validated};
pub use error::{ValidationError, ValidationResult, Violation, ViolationKind};
pub use id::{Identifier, canonicalize, canonicalize_part_id};
pub use price::{Price, PriceTag, Rating};
pub use reader::{ObjectReader, Scope};
pub use value_object::ValueObject;
