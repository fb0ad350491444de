//! Parts and their variants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bikeparts_core::reader::{ObjectReader, each_element, each_entry, identifier, typed};
use bikeparts_core::{
    Entity, Identifier, NamedEntity, Scope, Validated, ValidationResult, Violation,
};

use crate::item::{CollectionName, check_collection};
use crate::listing::Listing;
use crate::named::{read_name_and_id, resolve_id};

/// Mechanical component a part belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentName {
    Frame,
    Fork,
    Headset,
    Shock,
    BottomBracket,
    Wheel,
    Tire,
    Handlebar,
    Stem,
    Seatpost,
    Saddle,
    Crankset,
    Chainring,
    Chain,
    Cassette,
    Derailleur,
    Brake,
    Pedal,
    Fender,
    Tool,
    Other,
}

/// One purchasable version of a part (size, colour, model year, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    id: Identifier,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_code: Option<String>,
    on_wish_list: bool,
    /// Offers keyed by shop id.
    listings: BTreeMap<Identifier, Listing>,
}

impl Variant {
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn product_code(&self) -> Option<&str> {
        self.product_code.as_deref()
    }

    pub fn on_wish_list(&self) -> bool {
        self.on_wish_list
    }

    pub fn listings(&self) -> &BTreeMap<Identifier, Listing> {
        &self.listings
    }

    pub fn listing(&self, shop_id: &str) -> Option<&Listing> {
        self.listings.get(shop_id)
    }
}

impl Entity for Variant {
    type Id = Identifier;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl NamedEntity for Variant {
    fn name(&self) -> &str {
        &self.name
    }
}

fn listings_by_shop(
    scope: &Scope,
    value: &Value,
) -> ValidationResult<BTreeMap<Identifier, Listing>> {
    let entries = each_entry(scope, value, |s, key, v| {
        let shop_id = Identifier::parse_at(s.path(), key)?;
        let listing = Listing::validate_at(s, v)?;
        Ok((shop_id, listing))
    })?;
    Ok(entries.into_iter().collect())
}

impl Validated for Variant {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let (name, id) = read_name_and_id(&mut r);
        let year = r.optional("year", typed::<i32>);
        let product_code = r.optional("product_code", typed::<String>);
        let on_wish_list = r.optional("on_wish_list", typed::<bool>);
        let listings = r.optional("listings", listings_by_shop);
        r.finish()?;

        let (
            Some(name),
            Some(id),
            Some(year),
            Some(product_code),
            Some(on_wish_list),
            Some(listings),
        ) = (name, id, year, product_code, on_wish_list, listings)
        else {
            return Err(Violation::shape(scope.path(), "incomplete variant").into());
        };
        let id = resolve_id(scope, id, &name, || Identifier::from_name(&name))?;
        Ok(Self {
            id,
            name,
            year,
            product_code,
            on_wish_list: on_wish_list.unwrap_or(false),
            listings: listings.unwrap_or_default(),
        })
    }
}

/// A catalog part, e.g. a rear derailleur model of one manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    id: Identifier,
    name: String,
    component: ComponentName,
    manufacturer_id: Identifier,
    /// In display order.
    variants: Vec<Variant>,
}

impl Part {
    pub fn component(&self) -> ComponentName {
        self.component
    }

    pub fn manufacturer_id(&self) -> &Identifier {
        &self.manufacturer_id
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id.as_str() == id)
    }
}

impl Entity for Part {
    type Id = Identifier;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl NamedEntity for Part {
    fn name(&self) -> &str {
        &self.name
    }
}

fn unique_variant_ids(scope: &Scope, variants: &[Variant]) -> Result<(), Violation> {
    let mut seen = BTreeSet::new();
    for (i, variant) in variants.iter().enumerate() {
        if !seen.insert(variant.id.as_str()) {
            return Err(Violation::invariant(
                scope.field("variants").index(i).field("id").path(),
                format!("variant id `{}` is used twice", variant.id),
            ));
        }
    }
    Ok(())
}

impl Validated for Part {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        check_collection(&mut r, CollectionName::Parts);
        let (name, id) = read_name_and_id(&mut r);
        let component = r.required("component", typed::<ComponentName>);
        let manufacturer_id = r.required("manufacturer_id", identifier);
        let variants = r.optional("variants", |s, v| each_element(s, v, Variant::validate_at));
        r.finish()?;

        let (Some(name), Some(id), Some(component), Some(manufacturer_id), Some(variants)) =
            (name, id, component, manufacturer_id, variants)
        else {
            return Err(Violation::shape(scope.path(), "incomplete part").into());
        };
        let variants = variants.unwrap_or_default();
        unique_variant_ids(scope, &variants)?;
        let id = resolve_id(scope, id, &name, || Identifier::for_part(&manufacturer_id, &name))?;
        Ok(Self {
            id,
            name,
            component,
            manufacturer_id,
            variants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeparts_core::ViolationKind;
    use serde_json::json;

    fn part_payload() -> Value {
        json!({
            "name": "X0",
            "component": "derailleur",
            "manufacturer_id": "sram",
            "variants": [
                {
                    "name": "Eagle AXS",
                    "year": 2023,
                    "listings": {
                        "bike24": {
                            "price_tag": {"price": {"value": 389.9, "currency": "EUR"}},
                            "variables": {"part": "p2567890"},
                        }
                    }
                },
                {"name": "Eagle T-Type", "on_wish_list": true},
            ],
        })
    }

    #[test]
    fn part_id_is_namespaced_by_manufacturer() {
        let part = Part::from_value(&part_payload()).unwrap();
        assert_eq!(part.id().as_str(), "sram_x0");
        assert_eq!(part.component(), ComponentName::Derailleur);
    }

    #[test]
    fn variants_keep_their_order_and_defaults() {
        let part = Part::from_value(&part_payload()).unwrap();
        let ids: Vec<_> = part.variants().iter().map(|v| v.id().as_str()).collect();
        assert_eq!(ids, vec!["eagle_axs", "eagle_t_type"]);
        let first = &part.variants()[0];
        assert!(!first.on_wish_list());
        assert_eq!(first.year(), Some(2023));
        assert!(first.listing("bike24").is_some());
        let second = part.variant("eagle_t_type").unwrap();
        assert!(second.on_wish_list());
        assert!(second.listings().is_empty());
    }

    #[test]
    fn missing_variants_default_to_a_fresh_empty_list() {
        let a = Part::from_value(&json!({
            "name": "GX", "component": "derailleur", "manufacturer_id": "sram",
        }))
        .unwrap();
        assert!(a.variants().is_empty());
    }

    #[test]
    fn duplicate_variant_ids_are_rejected() {
        let mut payload = part_payload();
        payload["variants"][1]["name"] = json!("Eagle-AXS");
        let err = Part::from_value(&payload).unwrap_err();
        assert!(err.has_kind(ViolationKind::Invariant));
        assert!(err.has_path("variants[1].id"));
    }

    #[test]
    fn each_bad_variant_reports_its_first_problem() {
        let mut payload = part_payload();
        payload["variants"][0]["listings"]["bike24"]["price_tag"] = json!({});
        payload["variants"][1]["year"] = json!("soon");
        payload["variants"][1]["colour"] = json!("red");
        let err = Part::from_value(&payload).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.has_path("variants[0].listings.bike24.price_tag"));
        assert!(err.has_path("variants[1].year"));
    }

    #[test]
    fn year_and_product_code_are_unbounded() {
        let mut payload = part_payload();
        payload["variants"][1]["year"] = json!(1790);
        payload["variants"][1]["product_code"] = json!("7".repeat(150));
        let part = Part::from_value(&payload).unwrap();
        let variant = part.variant("eagle_t_type").unwrap();
        assert_eq!(variant.year(), Some(1790));
        assert_eq!(variant.product_code().map(str::len), Some(150));
    }

    #[test]
    fn listing_keys_must_be_shop_ids() {
        let mut payload = part_payload();
        payload["variants"][0]["listings"] = json!({
            "Bike 24": {"price_tag": {"available": true}, "variables": {"part": "x"}},
        });
        let err = Part::from_value(&payload).unwrap_err();
        assert!(err.has_path("variants[0].listings.Bike 24"));
    }

    #[test]
    fn round_trips_through_its_payload() {
        let part = Part::from_value(&part_payload()).unwrap();
        let again = Part::from_value(&part.to_value().unwrap()).unwrap();
        assert_eq!(part, again);
    }
}
