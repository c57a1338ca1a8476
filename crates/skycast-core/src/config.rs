use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, ConfigError};

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
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the settings and preference documents
    pub data_dir: PathBuf,

    /// Local HTTP API settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Kiosk display settings
    #[serde(default)]
    pub kiosk: KioskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the local HTTP API listens on
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_port: 8080 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Window classes tried when minimizing the kiosk browser window,
    /// in order, after the active window.
    pub window_classes: Vec<String>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            window_classes: vec![
                "chromium".to_string(),
                "chromium-browser".to_string(),
                "firefox".to_string(),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            data_dir,
            server: ServerConfig::default(),
            kiosk: KioskConfig::default(),
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

        Ok(Self::from_toml(&contents).map_err(AppError::Config)?)
    }

    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(AppError::Config(ConfigError::Invalid(validation.error_summary())).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.listen_port == 0 {
            result.add_error("server.listen_port", "Port cannot be 0");
        }

        if self.data_dir.as_os_str().is_empty() {
            result.add_error("data_dir", "Data directory must not be empty");
        }

        if self.kiosk.window_classes.is_empty() {
            result.add_warning(
                "kiosk.window_classes",
                "No window classes configured - minimize falls back to the active window only",
            );
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        let result = config.validate();
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut config = Config::default();
        config.server.listen_port = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "server.listen_port"));
    }

    #[test]
    fn empty_window_classes_is_a_warning() {
        let mut config = Config::default();
        config.kiosk.window_classes.clear();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "kiosk.window_classes"));
    }

    #[test]
    fn validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml("data_dir = [not toml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert_eq!(
            err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
    }

    #[test]
    fn config_errors_surface_through_anyhow() {
        let err: anyhow::Error =
            AppError::Config(ConfigError::Invalid("server.listen_port: Port cannot be 0".into()))
                .into();
        let app = err.downcast_ref::<AppError>().unwrap();
        assert_eq!(app.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.server.listen_port, config.server.listen_port);
        assert_eq!(back.kiosk.window_classes, config.kiosk.window_classes);
    }
}
