//! # docchat-telemetry
//!
//! Logging setup shared by docchat binaries and demos.
//!
//! The libraries only emit `tracing` events; installing a subscriber is left
//! to the application. Call one of the `init_*` functions once at startup:
//!
//! ```rust,ignore
//! docchat_telemetry::init_telemetry("docchat")?;
//! tracing::info!("ready");
//! ```
//!
//! The log level is taken from `RUST_LOG` and falls back to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[cfg(test)]
mod test_init;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Errors from subscriber installation.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed by this process.
    #[error("telemetry already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Build the env filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    Registry::default().with(env_filter()).with(fmt::layer().with_target(true)).try_init()?;
    tracing::debug!(service.name = service_name, "telemetry initialized");
    Ok(())
}

/// Install a subscriber that writes one JSON object per event.
pub fn init_json_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    Registry::default()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(true).with_span_list(false))
        .try_init()?;
    tracing::debug!(service.name = service_name, "telemetry initialized");
    Ok(())
}
