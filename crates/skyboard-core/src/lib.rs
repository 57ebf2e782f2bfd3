pub mod config;
pub mod error;
pub mod store;

pub use config::{
    Config, ConfigValidationError, DeviceLocationConfig, TemperatureUnit, ValidationResult,
    WeatherConfig,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};
pub use store::{FileStore, MemoryStore, PreferenceStore};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Skyboard core initialized");
    Ok(())
}
