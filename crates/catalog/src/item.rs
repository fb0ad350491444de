//! Collections and the `Item` union of top-level catalog entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bikeparts_core::reader::{ObjectReader, typed};
use bikeparts_core::{Entity, Identifier, Scope, Validated, ValidationResult, Violation};

use crate::manufacturer::Manufacturer;
use crate::part::Part;
use crate::shop::Shop;

/// Top-level store an entity belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionName {
    Parts,
    Manufacturers,
    Shops,
    Prices,
}

impl CollectionName {
    pub const ALL: [CollectionName; 4] = [
        CollectionName::Parts,
        CollectionName::Manufacturers,
        CollectionName::Shops,
        CollectionName::Prices,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionName::Parts => "parts",
            CollectionName::Manufacturers => "manufacturers",
            CollectionName::Shops => "shops",
            CollectionName::Prices => "prices",
        }
    }

    /// Whether the collection stores [`Item`]s (everything but `prices`).
    pub fn holds_items(self) -> bool {
        !matches!(self, CollectionName::Prices)
    }
}

impl core::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("`{s}` is not a collection"))
    }
}

/// Consume an optional `collection` tag and check it names `own`.
pub(crate) fn check_collection(r: &mut ObjectReader<'_>, own: CollectionName) {
    if let Some(Some(tag)) = r.optional("collection", typed::<CollectionName>) {
        if tag != own {
            let path = r.scope().field("collection");
            r.report(Violation::invariant(
                path.path(),
                format!("collection `{tag}` does not match a {own} payload"),
            ));
        }
    }
}

/// A catalog entity of any item collection, tagged by `collection`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "collection")]
pub enum Item {
    #[serde(rename = "parts")]
    Part(Part),
    #[serde(rename = "manufacturers")]
    Manufacturer(Manufacturer),
    #[serde(rename = "shops")]
    Shop(Shop),
}

impl Item {
    pub fn collection(&self) -> CollectionName {
        match self {
            Item::Part(_) => CollectionName::Parts,
            Item::Manufacturer(_) => CollectionName::Manufacturers,
            Item::Shop(_) => CollectionName::Shops,
        }
    }

    pub fn id(&self) -> &Identifier {
        match self {
            Item::Part(part) => part.id(),
            Item::Manufacturer(manufacturer) => manufacturer.id(),
            Item::Shop(shop) => shop.id(),
        }
    }

    /// Validate `value` as an item of `collection`.
    ///
    /// A `collection` tag inside the payload must agree with `collection`.
    pub fn validate_in(
        collection: CollectionName,
        scope: &Scope,
        value: &Value,
    ) -> ValidationResult<Self> {
        match collection {
            CollectionName::Parts => Part::validate_at(scope, value).map(Item::Part),
            CollectionName::Manufacturers => {
                Manufacturer::validate_at(scope, value).map(Item::Manufacturer)
            }
            CollectionName::Shops => Shop::validate_at(scope, value).map(Item::Shop),
            CollectionName::Prices => Err(Violation::invariant(
                scope.path(),
                "the prices collection does not hold catalog items",
            )
            .into()),
        }
    }
}

impl Validated for Item {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let tag = value
            .as_object()
            .ok_or_else(|| Violation::shape(scope.path(), "expected an object"))?
            .get("collection")
            .ok_or_else(|| {
                Violation::shape(scope.field("collection").path(), "field is required")
            })?;
        let collection = typed::<CollectionName>(&scope.field("collection"), tag)?;
        Self::validate_in(collection, scope, value)
    }
}

impl From<Part> for Item {
    fn from(value: Part) -> Self {
        Item::Part(value)
    }
}

impl From<Manufacturer> for Item {
    fn from(value: Manufacturer) -> Self {
        Item::Manufacturer(value)
    }
}

impl From<Shop> for Item {
    fn from(value: Shop) -> Self {
        Item::Shop(value)
    }
}
