//! Tracing initialization.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] (default `info`, overridable via
//! `RUST_LOG`) and a single fmt layer, either human-readable or one JSON object per line.
//!
//! ```bash
//! # Verbose repository logging, quiet everything else
//! RUST_LOG=warn,codecamp::db=debug codecamp -f config.yaml
//! ```

use crate::config::LogFormat;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing for the process. Fails if a global subscriber is already installed.
pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                .try_init()?;
        }
    }

    info!(?format, "Telemetry initialized");
    Ok(())
}
