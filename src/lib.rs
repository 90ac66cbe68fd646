pub mod config;
pub mod models;
pub mod store;
pub mod triage;

use tracing_subscriber::EnvFilter;

pub use config::EngineConfig;
pub use triage::{ConditionInput, TriageAssessment, TriageEngine, TriageError, TriagePriority};

/// Install the global `tracing` subscriber with the default filter.
/// `RUST_LOG` overrides it. Later calls are no-ops.
pub fn init_tracing() {
    init_tracing_with(config::default_log_filter());
}

/// Same as [`init_tracing`] with an explicit fallback filter, e.g.
/// [`EngineConfig::log_filter`].
pub fn init_tracing_with(default_filter: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
