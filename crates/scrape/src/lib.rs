//! Scrape configuration and scrape result schema.
//!
//! Declares which logical fields a scraper extracts from shop pages, how page
//! URLs are templated, and the shape of what comes back. Extraction itself is
//! done elsewhere; this crate only validates.

pub mod config;
pub mod field;
pub mod result;
pub mod target;
pub mod template;

pub use config::{PageKind, PageScrapeConfig, ScrapeMode, ScraperConfig, SearchScrapeConfig};
pub use field::{ScrapeField, ScrapeFields};
pub use result::{ScrapeResult, ScrapeResults, check_schema};
pub use target::ScrapeTargetName;
pub use template::UrlTemplate;
