//! Per-target extraction directives.

use serde::Serialize;
use serde_json::Value;

use bikeparts_core::reader::ObjectReader;
use bikeparts_core::{Scope, Validated, ValidationResult, Violation};

use crate::config::PageKind;
use crate::target::ScrapeTargetName;

/// Extraction directive for one target (selector, post-processing, ...).
///
/// Owned by the scraping-config library; only its presence matters here, so
/// the payload is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScrapeField(Value);

impl ScrapeField {
    pub fn new(directive: Value) -> Self {
        Self(directive)
    }

    pub fn directive(&self) -> &Value {
        &self.0
    }
}

/// Which directive extracts which target on one page type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScrapeFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacturer: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    part: Option<ScrapeField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<ScrapeField>,
}

impl ScrapeFields {
    pub fn get(&self, target: ScrapeTargetName) -> Option<&ScrapeField> {
        self.slot(target).as_ref()
    }

    fn slot(&self, target: ScrapeTargetName) -> &Option<ScrapeField> {
        match target {
            ScrapeTargetName::Url => &self.url,
            ScrapeTargetName::Name => &self.name,
            ScrapeTargetName::Manufacturer => &self.manufacturer,
            ScrapeTargetName::Price => &self.price,
            ScrapeTargetName::Available => &self.available,
            ScrapeTargetName::Rating => &self.rating,
            ScrapeTargetName::Discount => &self.discount,
            ScrapeTargetName::Part => &self.part,
            ScrapeTargetName::Variant => &self.variant,
        }
    }

    fn slot_mut(&mut self, target: ScrapeTargetName) -> &mut Option<ScrapeField> {
        match target {
            ScrapeTargetName::Url => &mut self.url,
            ScrapeTargetName::Name => &mut self.name,
            ScrapeTargetName::Manufacturer => &mut self.manufacturer,
            ScrapeTargetName::Price => &mut self.price,
            ScrapeTargetName::Available => &mut self.available,
            ScrapeTargetName::Rating => &mut self.rating,
            ScrapeTargetName::Discount => &mut self.discount,
            ScrapeTargetName::Part => &mut self.part,
            ScrapeTargetName::Variant => &mut self.variant,
        }
    }

    /// Every target configured with a placeholder directive.
    pub(crate) fn saturated() -> Self {
        let mut fields = Self::default();
        for target in ScrapeTargetName::ALL {
            *fields.slot_mut(target) = Some(ScrapeField::new(Value::Bool(true)));
        }
        fields
    }

    pub fn is_configured(&self, target: ScrapeTargetName) -> bool {
        self.get(target).is_some()
    }

    /// Configured targets, in [`ScrapeTargetName::ALL`] order.
    pub fn configured(&self) -> impl Iterator<Item = ScrapeTargetName> + '_ {
        ScrapeTargetName::ALL
            .into_iter()
            .filter(|target| self.is_configured(*target))
    }

    /// Validate the directives of one page type.
    ///
    /// Targets outside the enumerated set are shape errors; `part`/`variant` on
    /// a part page is a config error; no configured target at all violates the
    /// at-least-one invariant.
    pub fn validate_for(scope: &Scope, value: &Value, kind: PageKind) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let mut fields = Self::default();
        for key in r.keys() {
            let path = scope.field(key);
            let directive = r.raw(key);
            let target = match key.parse::<ScrapeTargetName>() {
                Ok(target) => target,
                Err(rule) => {
                    r.report(Violation::shape(path.path(), rule));
                    continue;
                }
            };
            let Some(directive) = directive else {
                continue;
            };
            if target.is_search_only() && kind == PageKind::Part {
                r.report(Violation::config(
                    path.path(),
                    format!("target `{target}` is only available on search pages"),
                ));
                continue;
            }
            *fields.slot_mut(target) = Some(ScrapeField::new(directive.clone()));
        }
        r.finish()?;

        if fields.configured().next().is_none() {
            return Err(Violation::invariant(
                scope.path(),
                "at least one scrape target must be configured",
            )
            .into());
        }
        Ok(fields)
    }
}

impl Validated for ScrapeFields {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        Self::validate_for(scope, value, PageKind::Search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeparts_core::ViolationKind;
    use serde_json::json;

    #[test]
    fn all_null_targets_are_rejected() {
        let err = ScrapeFields::from_value(&json!({"name": null, "price": null})).unwrap_err();
        assert!(err.has_kind(ViolationKind::Invariant));
        let err = ScrapeFields::from_value(&json!({})).unwrap_err();
        assert!(err.has_kind(ViolationKind::Invariant));
    }

    #[test]
    fn configured_targets_are_reported_in_order() {
        let fields = ScrapeFields::from_value(&json!({
            "price": {"css": ".price"},
            "name": {"css": "h1"},
        }))
        .unwrap();
        let configured: Vec<_> = fields.configured().collect();
        assert_eq!(
            configured,
            vec![ScrapeTargetName::Name, ScrapeTargetName::Price]
        );
        assert_eq!(
            fields.get(ScrapeTargetName::Name).map(ScrapeField::directive),
            Some(&json!({"css": "h1"}))
        );
    }

    #[test]
    fn unknown_target_is_a_shape_error() {
        let err = ScrapeFields::from_value(&json!({"name": "h1", "sku": ".sku"})).unwrap_err();
        assert!(err.has_path("sku"));
        assert!(err.has_kind(ViolationKind::Shape));
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn search_targets_are_rejected_on_part_pages() {
        let value = json!({"name": "h1", "part": ".part"});
        let err = ScrapeFields::validate_for(&Scope::root(), &value, PageKind::Part).unwrap_err();
        assert!(err.has_kind(ViolationKind::Config));
        assert!(ScrapeFields::validate_for(&Scope::root(), &value, PageKind::Search).is_ok());
    }

    #[test]
    fn serialized_form_round_trips() {
        let fields = ScrapeFields::from_value(&json!({"rating": {"css": ".stars"}})).unwrap();
        let again = ScrapeFields::from_value(&fields.to_value().unwrap()).unwrap();
        assert_eq!(fields, again);
    }
}
