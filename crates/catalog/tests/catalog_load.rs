use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Value, json};

use bikeparts_catalog::{
    Catalog, ComponentName, InvalidRecordPolicy, Listing, LoadOptions, Manufacturer,
    ProductPricing, Validated,
};
use bikeparts_core::{Entity, NamedEntity, ViolationKind, canonicalize};
use bikeparts_scrape::{ScrapeResults, ScrapeTargetName};

fn catalog_json() -> Value {
    json!({
        "manufacturers": [
            {"name": "SRAM", "url": "https://www.sram.com"},
            {"name": "Brooks England"},
        ],
        "shops": [
            {
                "name": "Bike-Components",
                "url": "https://www.bike-components.de",
                "currency": "EUR",
                "mwst": 0.19,
                "shipping_cost": 4.95,
                "scraper_config": {
                    "mode": "browser",
                    "part": {
                        "default": {
                            "url_extra": "/en/{part}/",
                            "fields": {
                                "url": {"css": "link[rel=canonical]", "attr": "href"},
                                "name": {"css": "h1"},
                                "price": {"css": ".price"},
                                "available": {"css": ".stock"},
                            },
                        },
                        "variant": {
                            "url_extra": "/en/{part}/?v={variant}",
                            "fields": {"price": {"css": ".price"}},
                        },
                    },
                    "search": {
                        "url_extra": "/en/search/?keywords={query}",
                        "fields": {"part": {"css": ".product a"}, "name": {"css": ".title"}},
                    },
                },
            },
        ],
        "parts": [
            {
                "name": "X0 Eagle",
                "component": "derailleur",
                "manufacturer_id": "sram",
                "variants": [
                    {
                        "name": "AXS",
                        "year": 2023,
                        "product_code": "00.7518.237.000",
                        "listings": {
                            "bike_components": {
                                "last_modified": "2024-04-01T10:00:00Z",
                                "price_tag": {
                                    "price": {"value": 389.9, "currency": "EUR"},
                                    "available": true,
                                },
                                "variables": {"part": "sram-x0-eagle-axs"},
                            },
                        },
                    },
                ],
            },
            {
                "name": "B17",
                "component": "saddle",
                "manufacturer_id": "brooks_england",
            },
        ],
    })
}

#[test]
fn loads_a_complete_catalog() -> Result<()> {
    bikeparts_observability::init();

    let outcome = Catalog::load(&catalog_json(), &LoadOptions::default())?;
    let catalog = outcome.catalog;
    assert!(outcome.skipped.is_empty());

    let derailleur = catalog.part("sram_x0_eagle").expect("part loaded");
    assert_eq!(derailleur.component(), ComponentName::Derailleur);
    let axs = derailleur.variant("axs").expect("variant loaded");
    let listing = axs.listing("bike_components").expect("listing loaded");
    assert_eq!(
        listing.last_modified(),
        Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap()
    );

    let shop = catalog.shop("bike_components").expect("shop loaded");
    let url = shop.part_url("default", listing.variables()).map_err(anyhow::Error::msg)?;
    assert_eq!(url.as_str(), "https://www.bike-components.de/en/sram-x0-eagle-axs/");

    let saddle = catalog.part("brooks_england_b17").expect("part loaded");
    assert!(saddle.variants().is_empty());
    Ok(())
}

#[test]
fn serialized_catalog_loads_back_unchanged() -> Result<()> {
    let catalog = Catalog::from_value(&catalog_json())?;
    let again = Catalog::from_value(&catalog.to_value()?)?;
    assert_eq!(catalog, again);
    Ok(())
}

#[test]
fn scrape_results_become_listings_and_prices() -> Result<()> {
    let catalog = Catalog::from_value(&catalog_json())?;
    let shop = catalog.shop("bike_components").expect("shop loaded");
    let page = shop.scraper_config().part_page("default").expect("default page");

    let scraped = ScrapeResults::from_value(&json!({
        "url": "https://www.bike-components.de/en/sram-x0-eagle-axs/",
        "name": "SRAM X0 Eagle AXS Transmission",
        "price": {"value": 379.0, "currency": "EUR"},
        "available": false,
    }))?;
    assert_eq!(scraped.len(), 1);
    let (group, result) = scraped.iter().next().expect("one result");
    assert!(group.is_none());
    result.reconcile(page.fields())?;

    let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let variables = BTreeMap::from([("part".to_string(), "sram-x0-eagle-axs".to_string())]);
    let listing = Listing::from_scrape(result, variables, at)?;
    assert_eq!(listing.price_tag().available(), Some(false));

    let part = catalog.part("sram_x0_eagle").expect("part loaded");
    let variant = part.variant("axs").expect("variant loaded");
    let pricing = ProductPricing::from_scrape(
        part.id().clone(),
        variant.id().clone(),
        shop.id().clone(),
        result,
        at,
    )?;
    assert_eq!(pricing.price_tag(), listing.price_tag());

    let listing_json = listing.to_value()?;
    let updated = catalog.with_change(|v| {
        v["parts"][0]["variants"][0]["listings"]["bike_components"] = listing_json;
    })?;
    let stored = updated
        .part("sram_x0_eagle")
        .and_then(|p| p.variant("axs"))
        .and_then(|v| v.listing("bike_components"))
        .expect("listing kept");
    assert_eq!(stored, &listing);
    Ok(())
}

#[test]
fn unrequested_scrape_targets_are_flagged() -> Result<()> {
    let catalog = Catalog::from_value(&catalog_json())?;
    let fields = catalog
        .shop("bike_components")
        .and_then(|s| s.scraper_config().part_page("variant"))
        .expect("variant page")
        .fields();
    assert!(fields.is_configured(ScrapeTargetName::Price));

    let scraped = ScrapeResults::from_value(&json!([
        {"price": {"value": 12.5, "currency": "EUR"}},
        {"price": {"value": 13.0, "currency": "EUR"}, "rating": 4},
    ]))?;
    let outcomes: Vec<_> = scraped.iter().map(|(_, r)| r.reconcile(fields)).collect();
    assert!(outcomes[0].is_ok());
    let err = outcomes[1].clone().unwrap_err();
    assert!(err.has_path("rating"));
    Ok(())
}

#[test]
fn edits_are_validated_again() -> Result<()> {
    let catalog = Catalog::from_value(&catalog_json())?;

    let err = catalog
        .with_change(|v| v["parts"][0]["variants"][0]["year"] = json!("MMXXIII"))
        .unwrap_err();
    assert!(err.has_path("parts[0].variants[0].year"));

    let err = catalog
        .with_change(|v| v["shops"][0]["scraper_config"]["part"] = json!({}))
        .unwrap_err();
    assert!(err.has_kind(ViolationKind::Config));
    assert!(err.has_path("shops[0].scraper_config.part"));

    let renamed = catalog.with_change(|v| v["manufacturers"][0]["name"] = json!("SRAM LLC"))?;
    let sram = renamed.manufacturer("sram").expect("id survives a rename");
    assert_eq!(sram.name(), "SRAM LLC");
    Ok(())
}

#[test]
fn skip_policy_drops_bad_records_and_their_dependents() -> Result<()> {
    let mut payload = catalog_json();
    payload["manufacturers"][0]["url"] = json!("ftp://sram.com");
    let options = LoadOptions {
        on_invalid: InvalidRecordPolicy::Skip,
        ..LoadOptions::default()
    };

    let outcome = Catalog::load(&payload, &options)?;
    assert_eq!(outcome.skipped.len(), 2);
    assert!(outcome.skipped[0].has_path("manufacturers[0].url"));
    assert!(outcome.skipped[1].has_path("parts[0].manufacturer_id"));
    assert!(outcome.catalog.manufacturer("sram").is_none());
    assert_eq!(outcome.catalog.parts().len(), 1);

    let err = Catalog::load(&payload, &LoadOptions::default()).unwrap_err();
    assert!(err.has_path("manufacturers[0].url"));
    assert!(err.has_path("parts[0].manufacturer_id"));
    Ok(())
}

#[test]
fn load_options_come_from_config_json() -> Result<()> {
    let options: LoadOptions = serde_json::from_value(json!({"on_invalid": "skip"}))?;
    assert_eq!(options.on_invalid, InvalidRecordPolicy::Skip);
    assert!(options.check_references);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn manufacturer_ids_follow_their_first_name(
        name in "[A-Za-z][A-Za-z0-9 .-]{0,40}",
        rename in "[A-Za-z][A-Za-z0-9 ]{0,40}",
    ) {
        let m = Manufacturer::from_value(&json!({"name": name})).unwrap();
        prop_assert_eq!(m.id().as_str(), canonicalize(&name));

        let renamed = m.with_change(|v| v["name"] = json!(rename)).unwrap();
        prop_assert_eq!(renamed.id(), m.id());
        prop_assert_eq!(renamed.name(), rename.as_str());
    }
}
