use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather gateway settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Connectivity probe settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key for the weather service
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the weather service
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

fn default_gateway_url() -> String {
    "https://api.openweathermap.org".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            gateway_url: default_gateway_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// host:port probed to decide whether the device is online
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,

    /// Seconds between reachability probes
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    /// Seconds to wait for a probe connection before counting it offline
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_probe_addr() -> String {
    "1.1.1.1:443".to_string()
}

fn default_probe_interval() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    5
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_addr: default_probe_addr(),
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the directory holding the forecast slot and favorites
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl StorageConfig {
    /// Effective data directory: the configured override, or the platform
    /// data directory.
    pub fn data_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("skycast"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.gateway_url, "weather.gateway_url", &mut result);

        if self.weather.api_key.is_empty() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - forecast fetches will be rejected",
            );
        }

        if self.network.probe_addr.is_empty() {
            result.add_error("network.probe_addr", "Probe address must not be empty");
        } else if !self.network.probe_addr.contains(':') {
            result.add_error(
                "network.probe_addr",
                "Probe address must be in host:port form",
            );
        }

        if self.network.probe_interval_secs == 0 {
            result.add_warning(
                "network.probe_interval_secs",
                "Connectivity probing disabled (0 seconds)",
            );
        }

        if self.network.probe_timeout_secs == 0 {
            result.add_error(
                "network.probe_timeout_secs",
                "Probe timeout must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
