//! Shops and their scraper configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use bikeparts_core::reader::{ObjectReader, http_url, non_negative_f64, typed};
use bikeparts_core::{
    Entity, Identifier, NamedEntity, Scope, Validated, ValidationResult, Violation,
};
use bikeparts_scrape::ScraperConfig;

use crate::item::{CollectionName, check_collection};
use crate::named::{read_name_and_id, resolve_id};

/// Currencies shops may list prices in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Chf,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// An online shop that listings point at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shop {
    id: Identifier,
    name: String,
    url: Url,
    currency: Currency,
    /// VAT rate as a fraction (`0.19` for 19%).
    #[serde(skip_serializing_if = "Option::is_none")]
    mwst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_cost: Option<f64>,
    scraper_config: ScraperConfig,
}

impl Shop {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn mwst(&self) -> Option<f64> {
        self.mwst
    }

    pub fn shipping_cost(&self) -> Option<f64> {
        self.shipping_cost
    }

    pub fn scraper_config(&self) -> &ScraperConfig {
        &self.scraper_config
    }

    /// Absolute URL of a part page, rendered from `variables`.
    pub fn part_url(
        &self,
        shape: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<Url, String> {
        let page = self
            .scraper_config
            .part_page(shape)
            .ok_or_else(|| format!("shop `{}` has no part page `{shape}`", self.id))?;
        let suffix = page.url_extra().render(variables)?;
        let joined = format!("{}{}", self.url.as_str().trim_end_matches('/'), suffix);
        Url::parse(&joined).map_err(|e| format!("rendered URL `{joined}` is invalid: {e}"))
    }

    /// Whether `variables` fill every placeholder of at least one part page.
    pub fn can_render_part_page(&self, variables: &BTreeMap<String, String>) -> bool {
        self.scraper_config
            .part_pages()
            .values()
            .any(|page| page.url_extra().render(variables).is_ok())
    }
}

impl Entity for Shop {
    type Id = Identifier;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl NamedEntity for Shop {
    fn name(&self) -> &str {
        &self.name
    }
}

fn vat_rate(scope: &Scope, value: &Value) -> ValidationResult<f64> {
    let rate = non_negative_f64(scope, value)?;
    if rate > 1.0 {
        return Err(Violation::shape(scope.path(), "VAT rate is a fraction in 0..=1").into());
    }
    Ok(rate)
}

impl Validated for Shop {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        check_collection(&mut r, CollectionName::Shops);
        let (name, id) = read_name_and_id(&mut r);
        let url = r.required("url", http_url);
        let currency = r.required("currency", typed::<Currency>);
        let mwst = r.optional("mwst", vat_rate);
        let shipping_cost = r.optional("shipping_cost", non_negative_f64);
        let scraper_config = r.required("scraper_config", ScraperConfig::validate_at);
        r.finish()?;

        let (
            Some(name),
            Some(id),
            Some(url),
            Some(currency),
            Some(mwst),
            Some(shipping_cost),
            Some(scraper_config),
        ) = (name, id, url, currency, mwst, shipping_cost, scraper_config)
        else {
            return Err(Violation::shape(scope.path(), "incomplete shop").into());
        };
        let id = resolve_id(scope, id, &name, || Identifier::from_name(&name))?;
        Ok(Self {
            id,
            name,
            url,
            currency,
            mwst,
            shipping_cost,
            scraper_config,
        })
    }
}
