//! Subscriber setup for the binary and for tests that want to see events.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins; otherwise the configured filter, otherwise `info` when
/// `verbose` and `warn` when not. A second call is a no-op.
pub fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let fallback = logging
        .filter
        .clone()
        .unwrap_or_else(|| if verbose { "info" } else { "warn" }.to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match logging.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    if let Err(e) = result {
        tracing::debug!("logging already initialised: {}", e);
    }
}
