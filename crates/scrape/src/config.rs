//! Shop scraper configuration: part pages, search page and browser mode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bikeparts_core::reader::{ObjectReader, each_entry, typed};
use bikeparts_core::{Scope, Validated, ValidationResult, Violation};

use crate::field::ScrapeFields;
use crate::template::UrlTemplate;

/// Page type a config describes; fixes the template variables it may use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PageKind {
    Part,
    Search,
}

impl PageKind {
    pub fn allowed_variables(self) -> &'static [&'static str] {
        match self {
            PageKind::Part => &["part", "variant"],
            PageKind::Search => &["query"],
        }
    }
}

/// How the scraper loads pages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    Browser,
    Headless,
}

fn read_page(
    scope: &Scope,
    value: &Value,
    kind: PageKind,
) -> ValidationResult<(UrlTemplate, ScrapeFields)> {
    let mut r = ObjectReader::open(scope, value)?;
    let url_extra = r.required("url_extra", |s, v| {
        let template = typed::<String>(s, v)?;
        UrlTemplate::parse(s, &template, kind.allowed_variables())
    });
    let fields = r.required("fields", |s, v| ScrapeFields::validate_for(s, v, kind));
    r.finish()?;

    let (Some(url_extra), Some(fields)) = (url_extra, fields) else {
        return Err(Violation::shape(scope.path(), "incomplete page config").into());
    };
    Ok((url_extra, fields))
}

/// How to scrape a single part's product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageScrapeConfig {
    url_extra: UrlTemplate,
    fields: ScrapeFields,
}

impl PageScrapeConfig {
    pub fn url_extra(&self) -> &UrlTemplate {
        &self.url_extra
    }

    pub fn fields(&self) -> &ScrapeFields {
        &self.fields
    }
}

impl Validated for PageScrapeConfig {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let (url_extra, fields) = read_page(scope, value, PageKind::Part)?;
        Ok(Self { url_extra, fields })
    }
}

/// How to scrape a shop's search results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchScrapeConfig {
    url_extra: UrlTemplate,
    fields: ScrapeFields,
}

impl SearchScrapeConfig {
    pub fn url_extra(&self) -> &UrlTemplate {
        &self.url_extra
    }

    pub fn fields(&self) -> &ScrapeFields {
        &self.fields
    }
}

impl Validated for SearchScrapeConfig {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let (url_extra, fields) = read_page(scope, value, PageKind::Search)?;
        Ok(Self { url_extra, fields })
    }
}

/// Everything a scraper runner needs to know about one shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScraperConfig {
    mode: ScrapeMode,
    /// Part page configs keyed by page shape (e.g. `default`, `bundle`).
    part: BTreeMap<String, PageScrapeConfig>,
    search: SearchScrapeConfig,
}

impl ScraperConfig {
    pub fn mode(&self) -> ScrapeMode {
        self.mode
    }

    pub fn part_pages(&self) -> &BTreeMap<String, PageScrapeConfig> {
        &self.part
    }

    pub fn part_page(&self, shape: &str) -> Option<&PageScrapeConfig> {
        self.part.get(shape)
    }

    pub fn search(&self) -> &SearchScrapeConfig {
        &self.search
    }
}

impl Validated for ScraperConfig {
    fn validate_at(scope: &Scope, value: &Value) -> ValidationResult<Self> {
        let mut r = ObjectReader::open(scope, value)?;
        let mode = r.required("mode", typed::<ScrapeMode>);
        let part = r.required("part", |s, v| {
            let pages = each_entry(s, v, |s, key, v| {
                PageScrapeConfig::validate_at(s, v).map(|page| (key.to_string(), page))
            })?;
            if pages.is_empty() {
                return Err(Violation::config(
                    s.path(),
                    "at least one part page must be configured",
                )
                .into());
            }
            Ok(pages.into_iter().collect::<BTreeMap<_, _>>())
        });
        let search = r.required("search", SearchScrapeConfig::validate_at);
        r.finish()?;

        let (Some(mode), Some(part), Some(search)) = (mode, part, search) else {
            return Err(Violation::shape(scope.path(), "incomplete scraper config").into());
        };
        Ok(Self { mode, part, search })
    }
}
