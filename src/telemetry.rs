use super::config::{DEFAULT_LOG_FILTER, ReviewConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// an unparseable directive falls back to the default rather than silencing everything
fn filter_for(config: &ReviewConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global fmt subscriber filtered by `config.log_filter`.
///
/// Safe to call more than once; later calls leave the first subscriber in place
/// and return `false`.
pub fn init_tracing(config: &ReviewConfig) -> bool {
    tracing_subscriber::registry()
        .with(filter_for(config))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
