//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

use crate::ObservabilityConfig;

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter directives used when `RUST_LOG` is unset.
pub fn directives(config: &ObservabilityConfig) -> &str {
    config.filter.as_deref().unwrap_or(DEFAULT_DIRECTIVES)
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed; later calls are
/// no-ops.
pub fn init(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(config)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init()
    } else {
        builder.try_init()
    }
    .is_ok();
    if installed {
        ::tracing::debug!(json = config.json, "tracing subscriber installed");
    }
    installed
}
