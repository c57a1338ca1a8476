//! Shared foundation for Skycast: configuration, settings document,
//! error hierarchy, and unit conversions.

pub mod config;
pub mod error;
pub mod settings;
pub mod units;

pub use config::Config;
pub use error::{AppError, ConfigError};
pub use settings::{Settings, SettingsStore};
pub use units::{ClockFormat, LengthUnit, SpeedUnit, TemperatureUnit};

use anyhow::Result;

/// Initialize tracing for the whole application.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
