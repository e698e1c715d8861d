//! Tracing setup for the capture pipeline.
//!
//! A bare level in [`LoggingConfig::level`] (e.g. "debug") is scoped to
//! the CubeCap crates so host-engine noise stays at `warn`; a string that
//! already carries directives is handed to the filter unchanged.

use crate::config::LoggingConfig;

/// Crates covered when the configured level carries no directives.
const CRATE_TARGETS: [&str; 5] = [
    "cubecap_common",
    "cubecap_storage_index",
    "cubecap_processing_core",
    "cubecap_capture_engine",
    "cubecap_cli",
];

fn filter_directives(config: &LoggingConfig) -> String {
    use std::fmt::Write;

    if config.level.contains('=') || config.level.contains(',') {
        return config.level.clone();
    }
    let mut directives = String::from("warn");
    for target in CRATE_TARGETS {
        let _ = write!(directives, ",{target}={}", config.level);
    }
    directives
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured filter when set.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}
