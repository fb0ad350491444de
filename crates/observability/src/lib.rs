//! Shared tracing setup for binaries and tests.

use serde::Deserialize;

/// Log output settings. `RUST_LOG` wins over `filter` when set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `bikeparts_catalog=debug`.
    pub filter: Option<String>,
    /// JSON lines when set, human-readable text otherwise.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: None,
            json: true,
        }
    }
}

/// Initialize process-wide tracing: JSON logs at `info` unless `RUST_LOG` says otherwise.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::default());
}

/// Initialize process-wide tracing from `config`.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init(config);
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
