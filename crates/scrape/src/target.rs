//! Logical fields a scraper can be asked to extract.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Scrape target name.
///
/// `part` and `variant` only make sense on search pages, where one page lists
/// several products.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeTargetName {
    Url,
    Name,
    Manufacturer,
    Price,
    Available,
    Rating,
    Discount,
    Part,
    Variant,
}

impl ScrapeTargetName {
    pub const ALL: [ScrapeTargetName; 9] = [
        ScrapeTargetName::Url,
        ScrapeTargetName::Name,
        ScrapeTargetName::Manufacturer,
        ScrapeTargetName::Price,
        ScrapeTargetName::Available,
        ScrapeTargetName::Rating,
        ScrapeTargetName::Discount,
        ScrapeTargetName::Part,
        ScrapeTargetName::Variant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeTargetName::Url => "url",
            ScrapeTargetName::Name => "name",
            ScrapeTargetName::Manufacturer => "manufacturer",
            ScrapeTargetName::Price => "price",
            ScrapeTargetName::Available => "available",
            ScrapeTargetName::Rating => "rating",
            ScrapeTargetName::Discount => "discount",
            ScrapeTargetName::Part => "part",
            ScrapeTargetName::Variant => "variant",
        }
    }

    /// Whether the target identifies a product among several on one page.
    pub fn is_search_only(self) -> bool {
        matches!(self, ScrapeTargetName::Part | ScrapeTargetName::Variant)
    }
}

impl core::fmt::Display for ScrapeTargetName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrapeTargetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| format!("`{s}` is not a scrape target"))
    }
}
