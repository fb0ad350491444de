//! A variant's offer at one shop.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use bikeparts_core::reader::{ObjectReader, each_entry, http_url, typed};
use bikeparts_core::{PriceTag, Scope, Validated, ValidationResult, Violation};
use bikeparts_scrape::{PageKind, ScrapeResult};

/// What a shop offers for one variant, as of `last_modified`.
///
/// `variables` are substituted into the shop's part page template to reach the
/// product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacturer: Option<String>,
    price_tag: PriceTag,
    variables: BTreeMap<String, String>,
}

fn template_variables(scope: &Scope, value: &Value) -> ValidationResult<BTreeMap<String, String>> {
    let allowed = PageKind::Part.allowed_variables();
    let entries = each_entry(scope, value, |s, key, v| {
        if !allowed.contains(&key) {
            return Err(Violation::shape(
                s.path(),
                format!("`{key}` is not a part page variable (allowed: {})", allowed.join(", ")),
            )
            .into());
        }
        let text = typed::<String>(s, v)?;
        Ok((key.to_string(), text))
    })?;
    if entries.is_empty() {
        return Err(Violation::shape(scope.path(), "at least one variable is required").into());
    }
    Ok(entries.into_iter().collect())
}

impl Listing {
    /// Snapshot a validated scrape result as a listing captured at `at`.
    pub fn from_scrape(
        result: &ScrapeResult,
        variables: BTreeMap<String, String>,
        at: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        let root = Scope::root();
        let price_tag = result.price_tag().ok_or_else(|| {
            Violation::invariant(
                root.field("price_tag").path(),
                "scrape result carries no price information",
            )
        })?;
        let variables =
            template_variables(&root.field("variables"), &serde_json::json!(variables))?;
        Ok(Self {
            last_modified: at,
            url: result.url().cloned(),
            name: result.name().map(str::to_owned),
            manufacturer: result.manufacturer().map(str::to_owned),
            price_tag,
            variables,
        })
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
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

    pub fn price_tag(&self) -> &PriceTag {
        &self.price_tag
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

impl Validated for Listing {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let last_modified = r.optional("last_modified", typed::<DateTime<Utc>>);
        let url = r.optional("url", http_url);
        let name = r.optional("name", typed::<String>);
        let manufacturer = r.optional("manufacturer", typed::<String>);
        let price_tag = r.required("price_tag", PriceTag::validate_at);
        let variables = r.required("variables", template_variables);
        r.finish()?;

        let (
            Some(last_modified),
            Some(url),
            Some(name),
            Some(manufacturer),
            Some(price_tag),
            Some(variables),
        ) = (last_modified, url, name, manufacturer, price_tag, variables)
        else {
            return Err(Violation::shape(scope.path(), "incomplete listing").into());
        };
        Ok(Self {
            last_modified: last_modified.unwrap_or_else(Utc::now),
            url,
            name,
            manufacturer,
            price_tag,
            variables,
        })
    }
}
