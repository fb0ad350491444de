//! Price observations handed to the persistence/aggregation side.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use bikeparts_core::reader::{ObjectReader, identifier, typed};
use bikeparts_core::{Identifier, PriceTag, Scope, Validated, ValidationResult, Violation};
use bikeparts_scrape::ScrapeResult;

use crate::item::{CollectionName, check_collection};

/// One observed price tag of a variant at a shop (`prices` collection record).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPricing {
    timestamp: DateTime<Utc>,
    part_id: Identifier,
    variant_id: Identifier,
    shop_id: Identifier,
    price_tag: PriceTag,
}

impl ProductPricing {
    /// Record the price information of a validated scrape result.
    pub fn from_scrape(
        part_id: Identifier,
        variant_id: Identifier,
        shop_id: Identifier,
        result: &ScrapeResult,
        timestamp: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        let price_tag = result.price_tag().ok_or_else(|| {
            Violation::invariant("price_tag", "scrape result carries no price information")
        })?;
        Ok(Self {
            timestamp,
            part_id,
            variant_id,
            shop_id,
            price_tag,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn part_id(&self) -> &Identifier {
        &self.part_id
    }

    pub fn variant_id(&self) -> &Identifier {
        &self.variant_id
    }

    pub fn shop_id(&self) -> &Identifier {
        &self.shop_id
    }

    pub fn price_tag(&self) -> &PriceTag {
        &self.price_tag
    }
}

impl Validated for ProductPricing {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        check_collection(&mut r, CollectionName::Prices);
        let timestamp = r.required("timestamp", typed::<DateTime<Utc>>);
        let part_id = r.required("part_id", identifier);
        let variant_id = r.required("variant_id", identifier);
        let shop_id = r.required("shop_id", identifier);
        let price_tag = r.required("price_tag", PriceTag::validate_at);
        r.finish()?;

        let (Some(timestamp), Some(part_id), Some(variant_id), Some(shop_id), Some(price_tag)) =
            (timestamp, part_id, variant_id, shop_id, price_tag)
        else {
            return Err(Violation::shape(scope.path(), "incomplete pricing record").into());
        };
        Ok(Self {
            timestamp,
            part_id,
            variant_id,
            shop_id,
            price_tag,
        })
    }
}
