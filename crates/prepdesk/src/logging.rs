//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::PrepdeskError;

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (usually
/// [`ClientConfig::log_filter`](crate::ClientConfig::log_filter)) applies.
/// Fails if the filter doesn't parse or a subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), PrepdeskError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| PrepdeskError::Logging(e.to_string()))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| PrepdeskError::Logging(e.to_string()))
}
