//! Catalog entities (manufacturers, shops, parts) and the catalog loader.
//!
//! Every entity is built through [`Validated::validate_at`] from an untyped
//! payload and is immutable afterwards; changes go through
//! [`Validated::with_change`], which validates the edited payload again.

pub mod item;
pub mod listing;
pub mod loader;
pub mod manufacturer;
mod named;
pub mod options;
pub mod part;
pub mod pricing;
pub mod shop;

pub use bikeparts_core::Validated;
pub use item::{CollectionName, Item};
pub use listing::Listing;
pub use loader::{Catalog, LoadOutcome};
pub use manufacturer::Manufacturer;
pub use options::{InvalidRecordPolicy, LoadOptions};
pub use part::{ComponentName, Part, Variant};
pub use pricing::ProductPricing;
pub use shop::{Currency, Shop};
