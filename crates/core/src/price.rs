//! Price value objects shared by listings and scrape results.

use serde::Serialize;
use serde_json::Value;

use crate::entity::Validated;
use crate::error::{ValidationResult, Violation};
use crate::reader::{ObjectReader, Scope, non_empty_str, non_negative_f64, typed};
use crate::value_object::ValueObject;

/// An amount in some currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Price {
    value: f64,
    currency: String,
}

impl ValueObject for Price {}

impl Price {
    pub fn new(value: f64, currency: impl Into<String>) -> ValidationResult<Self> {
        Self::from_value(&serde_json::json!({
            "value": value,
            "currency": currency.into(),
        }))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Validated for Price {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let amount = r.required("value", non_negative_f64);
        let currency = r.required("currency", non_empty_str);
        r.finish()?;

        let (Some(value), Some(currency)) = (amount, currency) else {
            return Err(Violation::shape(scope.path(), "incomplete price").into());
        };
        Ok(Self { value, currency })
    }
}

/// Customer rating on a 0 to 5 scale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl ValueObject for Rating {}

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, String> {
        if stars > Self::MAX {
            return Err(format!("rating {stars} outside 0..={}", Self::MAX));
        }
        Ok(Self(stars))
    }

    pub fn stars(self) -> u8 {
        self.0
    }

    /// Parse a JSON integer in `0..=5`.
    pub fn parse_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let stars = value
            .as_u64()
            .ok_or_else(|| Violation::shape(scope.path(), "expected a non-negative integer"))?;
        let stars = u8::try_from(stars)
            .map_err(|_| format!("rating {stars} outside 0..={}", Self::MAX))
            .and_then(Self::new)
            .map_err(|rule| Violation::shape(scope.path(), rule))?;
        Ok(stars)
    }
}

/// Price, availability, rating and discount observed for one listing.
///
/// At least one of the four slots must be filled: an all-empty tag carries no
/// information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTag {
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount: Option<bool>,
}

impl ValueObject for PriceTag {}

impl PriceTag {
    pub fn new(
        price: Option<Price>,
        available: Option<bool>,
        rating: Option<Rating>,
        discount: Option<bool>,
    ) -> ValidationResult<Self> {
        let tag = Self {
            price,
            available,
            rating,
            discount,
        };
        tag.check_non_empty(&Scope::root())?;
        Ok(tag)
    }

    pub fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }

    pub fn available(&self) -> Option<bool> {
        self.available
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn discount(&self) -> Option<bool> {
        self.discount
    }

    /// Fill state of `price`, `available`, `rating` and `discount`, in that order.
    pub fn filled(&self) -> [bool; 4] {
        [
            self.price.is_some(),
            self.available.is_some(),
            self.rating.is_some(),
            self.discount.is_some(),
        ]
    }

    fn check_non_empty(&self, scope: &Scope) -> Result<(), Violation> {
        if self.filled().iter().any(|filled| *filled) {
            Ok(())
        } else {
            Err(Violation::invariant(
                scope.path(),
                "price tag must set at least one of price, available, rating, discount",
            ))
        }
    }
}

impl Validated for PriceTag {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let price = r.optional("price", Price::validate_at);
        let available = r.optional("available", typed::<bool>);
        let rating = r.optional("rating", Rating::parse_at);
        let discount = r.optional("discount", typed::<bool>);
        r.finish()?;

        let (Some(price), Some(available), Some(rating), Some(discount)) =
            (price, available, rating, discount)
        else {
            return Err(Violation::shape(scope.path(), "incomplete price tag").into());
        };
        let tag = Self {
            price,
            available,
            rating,
            discount,
        };
        tag.check_non_empty(scope)?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn empty_price_tag_is_rejected() {
        let err = PriceTag::from_value(&json!({})).unwrap_err();
        assert!(err.has_kind(ViolationKind::Invariant));

        let err = PriceTag::from_value(&json!({"price": null, "rating": null})).unwrap_err();
        assert!(err.has_kind(ViolationKind::Invariant));
    }

    #[test]
    fn single_false_flag_is_information() {
        let tag = PriceTag::from_value(&json!({"available": false})).unwrap();
        assert_eq!(tag.available(), Some(false));
        assert_eq!(tag.filled(), [false, true, false, false]);
    }

    #[test]
    fn typed_constructor_checks_emptiness() {
        assert!(PriceTag::new(None, None, None, None).is_err());
        let price = Price::new(129.0, "EUR").unwrap();
        let tag = PriceTag::new(Some(price), None, None, Some(true)).unwrap();
        assert_eq!(tag.price().map(Price::currency), Some("EUR"));
    }

    #[test]
    fn shape_errors_are_reported_before_invariants() {
        let err = PriceTag::from_value(&json!({"rating": 6, "discount": "yes"})).unwrap_err();
        assert!(err.has_path("rating"));
        assert!(err.has_path("discount"));
        assert!(!err.has_kind(ViolationKind::Invariant));
    }

    #[test]
    fn price_rejects_negative_and_unknown_fields() {
        assert!(Price::new(-1.0, "EUR").is_err());
        assert!(Price::new(10.0, "").is_err());
        let err = Price::from_value(&json!({"value": 1.0, "currency": "EUR", "vat": 0.19}))
            .unwrap_err();
        assert!(err.has_path("vat"));
    }

    #[test]
    fn serialization_skips_empty_slots() {
        let tag = PriceTag::from_value(&json!({"rating": 4})).unwrap();
        assert_eq!(tag.to_value().unwrap(), json!({"rating": 4}));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: ratings are accepted exactly on 0..=5.
        #[test]
        fn rating_bounds(stars in 0u64..64) {
            let parsed = Rating::parse_at(&Scope::root(), &json!(stars));
            prop_assert_eq!(parsed.is_ok(), stars <= 5);
        }
    }
}
