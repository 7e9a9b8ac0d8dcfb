//! Log output setup.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a fmt subscriber. `RUST_LOG` takes precedence over
/// [`Config::log_filter`]. Returns `false` if a global subscriber was
/// already installed.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
