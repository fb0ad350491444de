//! Catalog loading configuration.

use serde::{Deserialize, Serialize};

/// What the loader does with a record that fails validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Fail the whole batch, reporting every invalid record.
    #[default]
    Abort,
    /// Drop invalid records (logged at `warn`) and keep the rest.
    Skip,
}

/// Options for [`crate::Catalog::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub on_invalid: InvalidRecordPolicy,
    /// Verify manufacturer/shop references and listing templates across
    /// collections.
    pub check_references: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            on_invalid: InvalidRecordPolicy::Abort,
            check_references: true,
        }
    }
}
