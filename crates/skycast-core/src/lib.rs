//! Core support for Skycast: configuration, storage errors, and logging
//! initialization shared by the weather and services crates.

pub mod config;
pub mod error;

pub use config::{Config, NetworkConfig, StorageConfig, ValidationResult, WeatherConfig};
pub use error::{RusqliteErrorExt, StorageError};

use anyhow::Result;

/// Initialize logging for the application.
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
