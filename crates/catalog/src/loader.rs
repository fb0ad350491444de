//! Catalog loading: `{manufacturers, shops, parts}` payloads into entities.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use bikeparts_core::{
    Entity, Identifier, Scope, Validated, ValidationError, ValidationResult, Violation,
};

use crate::item::{CollectionName, Item};
use crate::manufacturer::Manufacturer;
use crate::options::{InvalidRecordPolicy, LoadOptions};
use crate::part::Part;
use crate::shop::Shop;

/// Collections in dependency order: parts reference manufacturers and shops.
const LOAD_ORDER: [CollectionName; 3] = [
    CollectionName::Manufacturers,
    CollectionName::Shops,
    CollectionName::Parts,
];

/// A validated set of catalog items.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    manufacturers: Vec<Manufacturer>,
    shops: Vec<Shop>,
    parts: Vec<Part>,
}

/// Result of [`Catalog::load`]: the catalog plus records dropped by
/// [`InvalidRecordPolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub catalog: Catalog,
    pub skipped: Vec<ValidationError>,
}

impl Catalog {
    /// Validate a catalog payload keyed by collection name.
    pub fn load(value: &Value, options: &LoadOptions) -> ValidationResult<LoadOutcome> {
        Self::load_at(&Scope::root(), value, options)
    }

    fn load_at(
        scope: &Scope,
        value: &Value,
        options: &LoadOptions,
    ) -> ValidationResult<LoadOutcome> {
        let map = value.as_object().ok_or_else(|| {
            Violation::shape(scope.path(), "expected an object keyed by collection")
        })?;

        let mut loader = Loader {
            options,
            catalog: Catalog::default(),
            failures: Vec::new(),
            skipped: Vec::new(),
        };

        for key in map.keys() {
            let path = scope.field(key);
            match key.parse::<CollectionName>() {
                Ok(collection) if collection.holds_items() => {}
                Ok(collection) => loader.failures.push(Violation::config(
                    path.path(),
                    format!("`{collection}` records are not catalog items"),
                )),
                Err(rule) => loader.failures.push(Violation::shape(path.path(), rule)),
            }
        }

        for collection in LOAD_ORDER {
            let Some(records) = map.get(collection.as_str()).filter(|v| !v.is_null()) else {
                continue;
            };
            loader.load_collection(collection, &scope.field(collection.as_str()), records);
        }

        match ValidationError::from_violations(loader.failures) {
            Some(err) => Err(err),
            None => Ok(LoadOutcome {
                catalog: loader.catalog,
                skipped: loader.skipped,
            }),
        }
    }

    pub fn manufacturers(&self) -> &[Manufacturer] {
        &self.manufacturers
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn manufacturer(&self, id: &str) -> Option<&Manufacturer> {
        self.manufacturers.iter().find(|m| m.id().as_str() == id)
    }

    pub fn shop(&self, id: &str) -> Option<&Shop> {
        self.shops.iter().find(|s| s.id().as_str() == id)
    }

    pub fn part(&self, id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id().as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.manufacturers.len() + self.shops.len() + self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All items, manufacturers first.
    pub fn into_items(self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.len());
        items.extend(self.manufacturers.into_iter().map(Item::from));
        items.extend(self.shops.into_iter().map(Item::from));
        items.extend(self.parts.into_iter().map(Item::from));
        items
    }

    fn insert(&mut self, item: Item) {
        match item {
            Item::Manufacturer(m) => self.manufacturers.push(m),
            Item::Shop(s) => self.shops.push(s),
            Item::Part(p) => self.parts.push(p),
        }
    }

    /// First dangling reference of `part`, located under `scope`.
    fn check_part_references(&self, scope: &Scope, part: &Part) -> Result<(), Violation> {
        if self.manufacturer(part.manufacturer_id().as_str()).is_none() {
            return Err(Violation::config(
                scope.field("manufacturer_id").path(),
                format!("manufacturer `{}` is not in the catalog", part.manufacturer_id()),
            ));
        }
        for (i, variant) in part.variants().iter().enumerate() {
            for (shop_id, listing) in variant.listings() {
                let listing_scope = scope
                    .field("variants")
                    .index(i)
                    .field("listings")
                    .field(shop_id.as_str());
                let Some(shop) = self.shop(shop_id.as_str()) else {
                    return Err(Violation::config(
                        listing_scope.path(),
                        format!("shop `{shop_id}` is not in the catalog"),
                    ));
                };
                if !shop.can_render_part_page(listing.variables()) {
                    return Err(Violation::config(
                        listing_scope.field("variables").path(),
                        format!("variables do not fill any part page template of shop `{shop_id}`"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Validated for Catalog {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        Self::load_at(scope, value, &LoadOptions::default()).map(|outcome| outcome.catalog)
    }
}

struct Loader<'o> {
    options: &'o LoadOptions,
    catalog: Catalog,
    failures: Vec<Violation>,
    skipped: Vec<ValidationError>,
}

impl Loader<'_> {
    fn load_collection(&mut self, collection: CollectionName, scope: &Scope, records: &Value) {
        let Some(records) = records.as_array() else {
            self.failures
                .push(Violation::shape(scope.path(), "expected a list of records"));
            return;
        };

        let mut seen: BTreeSet<Identifier> = BTreeSet::new();
        let mut accepted = 0usize;
        for (i, raw) in records.iter().enumerate() {
            let record_scope = scope.record(i);
            let checked = Item::validate_in(collection, &record_scope, raw).and_then(|item| {
                if let (Item::Part(part), true) = (&item, self.options.check_references) {
                    self.catalog.check_part_references(&record_scope, part)?;
                }
                if !seen.insert(item.id().clone()) {
                    return Err(Violation::invariant(
                        record_scope.field("id").path(),
                        format!("id `{}` is used twice in {collection}", item.id()),
                    )
                    .into());
                }
                Ok(item)
            });
            match checked {
                Ok(item) => {
                    self.catalog.insert(item);
                    accepted += 1;
                }
                Err(err) => self.reject(err),
            }
        }
        tracing::debug!(%collection, accepted, total = records.len(), "validated collection");
    }

    fn reject(&mut self, err: ValidationError) {
        match self.options.on_invalid {
            InvalidRecordPolicy::Abort => self.failures.extend(err.into_violations()),
            InvalidRecordPolicy::Skip => {
                tracing::warn!(error = %err, "skipping invalid catalog record");
                self.skipped.push(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeparts_core::ViolationKind;
    use serde_json::json;

    fn catalog_payload() -> Value {
        json!({
            "manufacturers": [{"name": "SRAM"}, {"name": "Shimano"}],
            "shops": [{
                "name": "Bike24",
                "url": "https://www.bike24.de",
                "currency": "EUR",
                "scraper_config": {
                    "mode": "headless",
                    "part": {
                        "default": {"url_extra": "/p{part}.html", "fields": {"price": ".price"}},
                    },
                    "search": {"url_extra": "/search?q={query}", "fields": {"part": ".hit"}},
                },
            }],
            "parts": [{
                "name": "X0",
                "component": "derailleur",
                "manufacturer_id": "sram",
                "variants": [{
                    "name": "Eagle AXS",
                    "listings": {
                        "bike24": {"price_tag": {"available": true}, "variables": {"part": "123"}},
                    },
                }],
            }],
        })
    }

    #[test]
    fn loads_every_collection() {
        let outcome = Catalog::load(&catalog_payload(), &LoadOptions::default()).unwrap();
        let catalog = outcome.catalog;
        assert!(outcome.skipped.is_empty());
        assert_eq!(catalog.len(), 4);
        assert!(catalog.manufacturer("shimano").is_some());
        assert!(catalog.shop("bike24").is_some());
        assert!(catalog.part("sram_x0").is_some());
    }

    #[test]
    fn dangling_manufacturer_is_a_config_error() {
        let mut payload = catalog_payload();
        payload["parts"][0]["manufacturer_id"] = json!("campagnolo");
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_kind(ViolationKind::Config));
        assert!(err.has_path("parts[0].manufacturer_id"));

        let unchecked = LoadOptions {
            check_references: false,
            ..LoadOptions::default()
        };
        assert!(Catalog::load(&payload, &unchecked).is_ok());
    }

    #[test]
    fn listing_must_point_at_a_known_shop() {
        let mut payload = catalog_payload();
        let listing = payload["parts"][0]["variants"][0]["listings"]["bike24"].take();
        payload["parts"][0]["variants"][0]["listings"] = json!({"rose": listing});
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_path("parts[0].variants[0].listings.rose"));
    }

    #[test]
    fn listing_variables_must_render_a_part_page() {
        let mut payload = catalog_payload();
        payload["parts"][0]["variants"][0]["listings"]["bike24"]["variables"] =
            json!({"variant": "red"});
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_path("parts[0].variants[0].listings.bike24.variables"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut payload = catalog_payload();
        payload["manufacturers"] = json!([
            {"name": "SRAM"},
            {"name": "sram", "url": "https://sram.com"},
        ]);
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_path("manufacturers[1].id"));
    }

    #[test]
    fn abort_reports_every_bad_record() {
        let mut payload = catalog_payload();
        payload["manufacturers"] = json!([
            {"name": ""},
            {"name": "SRAM"},
            {"url": "https://x.com"},
            {"name": "", "url": "not a url", "founded": 1},
        ]);
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_path("manufacturers[0].name"));
        assert!(err.has_path("manufacturers[2].name"));
        for field in ["name", "url", "founded"] {
            assert!(err.has_path(&format!("manufacturers[3].{field}")), "{field}");
        }
    }

    #[test]
    fn skip_keeps_the_valid_records() {
        let mut payload = catalog_payload();
        payload["manufacturers"] = json!([{"name": ""}, {"name": "SRAM"}]);
        let options = LoadOptions {
            on_invalid: InvalidRecordPolicy::Skip,
            ..LoadOptions::default()
        };
        let outcome = Catalog::load(&payload, &options).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.catalog.manufacturers().len(), 1);
        assert!(outcome.catalog.part("sram_x0").is_some());
    }

    #[test]
    fn prices_and_unknown_collections_are_rejected() {
        let mut payload = catalog_payload();
        payload["prices"] = json!([]);
        payload["wheels"] = json!([]);
        let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
        assert!(err.has_kind(ViolationKind::Config));
        assert!(err.has_path("prices"));
        assert!(err.has_path("wheels"));
    }

    #[test]
    fn into_items_lists_manufacturers_first() {
        let catalog = Catalog::from_value(&catalog_payload()).unwrap();
        let collections: Vec<_> = catalog.into_items().iter().map(Item::collection).collect();
        assert_eq!(
            collections,
            vec![
                CollectionName::Manufacturers,
                CollectionName::Manufacturers,
                CollectionName::Shops,
                CollectionName::Parts,
            ]
        );
    }
}
