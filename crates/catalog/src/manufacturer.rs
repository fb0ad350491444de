//! Manufacturers.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use bikeparts_core::reader::{ObjectReader, http_url};
use bikeparts_core::{
    Entity, Identifier, NamedEntity, Scope, Validated, ValidationResult, Violation,
};

use crate::item::{CollectionName, check_collection};
use crate::named::{read_name_and_id, resolve_id};

/// A brand producing parts. Parts point at it by id; it holds no parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manufacturer {
    id: Identifier,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
}

impl Manufacturer {
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

impl Entity for Manufacturer {
    type Id = Identifier;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl NamedEntity for Manufacturer {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validated for Manufacturer {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        check_collection(&mut r, CollectionName::Manufacturers);
        let (name, id) = read_name_and_id(&mut r);
        let url = r.optional("url", http_url);
        r.finish()?;

        let (Some(name), Some(id), Some(url)) = (name, id, url) else {
            return Err(Violation::shape(scope.path(), "incomplete manufacturer").into());
        };
        let id = resolve_id(scope, id, &name, || Identifier::from_name(&name))?;
        Ok(Self { id, name, url })
    }
}
