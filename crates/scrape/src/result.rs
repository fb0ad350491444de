//! Values returned by a scraper, validated on the way back in.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use bikeparts_core::reader::{ObjectReader, each_element, each_entry, http_url, typed};
use bikeparts_core::{
    Identifier, Price, PriceTag, Rating, Scope, Validated, ValidationError, ValidationResult,
    Violation,
};

use crate::field::ScrapeFields;
use crate::target::ScrapeTargetName;

/// Outcome of the standing schema check, computed once per process.
static SCHEMA: Lazy<Result<(), ValidationError>> = Lazy::new(check_schema);

/// Verify that scrape configs and scrape results describe the same targets.
///
/// A `ScrapeFields` and a `ScrapeResult` with every slot filled must both
/// serialize to exactly the names in [`ScrapeTargetName::ALL`].
pub fn check_schema() -> Result<(), ValidationError> {
    let targets: BTreeSet<String> = ScrapeTargetName::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    let owners = [
        ("ScrapeFields", serialized_keys(&ScrapeFields::saturated())),
        ("ScrapeResult", serialized_keys(&ScrapeResult::saturated())),
    ];
    let violations: Vec<Violation> = owners
        .into_iter()
        .filter(|(_, keys)| *keys != targets)
        .map(|(owner, keys)| {
            Violation::invariant(
                owner,
                format!("serialized fields {keys:?} differ from the scrape target set"),
            )
        })
        .collect();
    match ValidationError::from_violations(violations) {
        Some(err) => {
            tracing::error!(error = %err, "scrape schema drift");
            Err(err)
        }
        None => Ok(()),
    }
}

fn serialized_keys<T: Serialize>(value: &T) -> BTreeSet<String> {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_object().map(|map| map.keys().cloned().collect()))
        .unwrap_or_default()
}

/// One product as extracted from a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScrapeResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<String>,
}

impl ScrapeResult {
    /// A result with every field set.
    fn saturated() -> Self {
        let text = || Some(String::from("-"));
        Self {
            url: Url::parse("https://example.com/").ok(),
            name: text(),
            manufacturer: text(),
            price: Price::new(0.0, "EUR").ok(),
            available: Some(true),
            rating: Rating::new(0).ok(),
            discount: Some(true),
            part: text(),
            variant: text(),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
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

    pub fn part(&self) -> Option<&str> {
        self.part.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn is_set(&self, target: ScrapeTargetName) -> bool {
        match target {
            ScrapeTargetName::Url => self.url.is_some(),
            ScrapeTargetName::Name => self.name.is_some(),
            ScrapeTargetName::Manufacturer => self.manufacturer.is_some(),
            ScrapeTargetName::Price => self.price.is_some(),
            ScrapeTargetName::Available => self.available.is_some(),
            ScrapeTargetName::Rating => self.rating.is_some(),
            ScrapeTargetName::Discount => self.discount.is_some(),
            ScrapeTargetName::Part => self.part.is_some(),
            ScrapeTargetName::Variant => self.variant.is_some(),
        }
    }

    /// The price tag part of this result, if it carries any information.
    pub fn price_tag(&self) -> Option<PriceTag> {
        PriceTag::new(self.price.clone(), self.available, self.rating, self.discount).ok()
    }

    /// Check that only targets configured in `fields` were populated.
    pub fn reconcile(&self, fields: &ScrapeFields) -> ValidationResult<()> {
        let violations: Vec<Violation> = ScrapeTargetName::ALL
            .into_iter()
            .filter(|target| self.is_set(*target) && !fields.is_configured(*target))
            .map(|target| {
                Violation::invariant(
                    target.as_str(),
                    format!("target `{target}` was returned but not requested"),
                )
            })
            .collect();
        match ValidationError::from_violations(violations) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Validated for ScrapeResult {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        (*SCHEMA).clone()?;

        let mut r = ObjectReader::open(scope, value)?;
        for key in r.keys() {
            if key.parse::<ScrapeTargetName>().is_err() {
                let _ = r.raw(key);
                r.report(Violation::invariant(
                    scope.field(key).path(),
                    format!("field `{key}` is not a valid scrape result field"),
                ));
            }
        }

        let mut result = Self::default();
        let mut complete = true;
        for target in ScrapeTargetName::ALL {
            let key = target.as_str();
            let read = match target {
                ScrapeTargetName::Url => r.optional(key, http_url).map(|v| result.url = v),
                ScrapeTargetName::Name => {
                    r.optional(key, typed::<String>).map(|v| result.name = v)
                }
                ScrapeTargetName::Manufacturer => r
                    .optional(key, typed::<String>)
                    .map(|v| result.manufacturer = v),
                ScrapeTargetName::Price => {
                    r.optional(key, Price::validate_at).map(|v| result.price = v)
                }
                ScrapeTargetName::Available => {
                    r.optional(key, typed::<bool>).map(|v| result.available = v)
                }
                ScrapeTargetName::Rating => {
                    r.optional(key, Rating::parse_at).map(|v| result.rating = v)
                }
                ScrapeTargetName::Discount => {
                    r.optional(key, typed::<bool>).map(|v| result.discount = v)
                }
                ScrapeTargetName::Part => {
                    r.optional(key, typed::<String>).map(|v| result.part = v)
                }
                ScrapeTargetName::Variant => {
                    r.optional(key, typed::<String>).map(|v| result.variant = v)
                }
            };
            complete &= read.is_some();
        }
        r.finish()?;

        if !complete {
            return Err(Violation::shape(scope.path(), "incomplete scrape result").into());
        }
        Ok(result)
    }
}

/// The shapes a scraper may hand back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeResults {
    /// Results grouped by the part (or query) they were scraped for.
    ByPart(BTreeMap<Identifier, Vec<ScrapeResult>>),
    Many(Vec<ScrapeResult>),
    Single(ScrapeResult),
}

impl ScrapeResults {
    /// Number of results across all groups.
    pub fn len(&self) -> usize {
        match self {
            ScrapeResults::Single(_) => 1,
            ScrapeResults::Many(results) => results.len(),
            ScrapeResults::ByPart(groups) => groups.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every result with the identifier of its group, if any.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Option<&Identifier>, &ScrapeResult)> + '_> {
        match self {
            ScrapeResults::Single(result) => Box::new(std::iter::once((None, result))),
            ScrapeResults::Many(results) => Box::new(results.iter().map(|r| (None, r))),
            ScrapeResults::ByPart(groups) => Box::new(
                groups
                    .iter()
                    .flat_map(|(id, results)| results.iter().map(move |r| (Some(id), r))),
            ),
        }
    }
}

impl Validated for ScrapeResults {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        match value {
            Value::Array(_) => {
                each_element(scope, value, ScrapeResult::validate_at).map(ScrapeResults::Many)
            }
            Value::Object(map) if map.is_empty() || !map.values().all(Value::is_array) => {
                ScrapeResult::validate_at(scope, value).map(ScrapeResults::Single)
            }
            Value::Object(_) => each_entry(scope, value, |s, key, v| {
                let id = Identifier::parse_at(s.path(), key)?;
                let results = each_element(s, v, ScrapeResult::validate_at)?;
                Ok((id, results))
            })
            .map(|groups| ScrapeResults::ByPart(groups.into_iter().collect())),
            _ => Err(Violation::shape(
                scope.path(),
                "expected a scrape result, a list of results or a map of lists",
            )
            .into()),
        }
    }
}
