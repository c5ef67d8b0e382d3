//! # Printer Configuration
//!
//! Connection and protocol settings for one fiscal printer, loaded from a
//! TOML file.
//!
//! ```toml
//! device = "/dev/ttyUSB0"
//! baud_rate = 9600
//! timeout_ms = 10000
//! reply_timeout_ms = 5000
//! error_check_delay_ms = 100
//! code_page = "mazovia"
//! error_handling = "silent"
//! ```
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `device` | `/dev/ttyS0` | Serial device path |
//! | `baud_rate` | 9600 | Line speed |
//! | `timeout_ms` | 10000 | Status byte read timeout |
//! | `reply_timeout_ms` | 5000 | Framed reply read timeout |
//! | `error_check_delay_ms` | 100 | Pause before the error query |
//! | `code_page` | `mazovia` | Text encoding on the wire |
//! | `error_handling` | unset | Mode sent when the printer is opened |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::codepage::CodePage;
use crate::protocol::commands::ErrorHandling;
use crate::transport::serial::{DEFAULT_DEVICE, SUPPORTED_BAUD_RATES};

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(PrinterConfig),
    /// Config file missing.
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// # Printer Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub device: String,
    pub baud_rate: u32,
    pub timeout_ms: u64,
    pub reply_timeout_ms: u64,
    pub error_check_delay_ms: u64,
    pub code_page: CodePage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_handling: Option<ErrorHandling>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: 9600,
            timeout_ms: 10_000,
            reply_timeout_ms: 5_000,
            error_check_delay_ms: 100,
            code_page: CodePage::default(),
            error_handling: None,
        }
    }
}

impl PrinterConfig {
    /// Default config file path (`novitus.toml` in the working directory).
    pub fn default_path() -> PathBuf {
        PathBuf::from("novitus.toml")
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PrinterConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match Self::load(path) {
            Ok(config) => ConfigLoadResult::Loaded(config),
            Err(e) => ConfigLoadResult::Invalid(e),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::Validation("Device path cannot be empty".to_string()));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ConfigError::Validation(format!(
                "Baud rate {} is not supported (use one of {:?})",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }
        if self.reply_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Reply timeout must be greater than 0".to_string(),
            ));
        }
        if self.error_check_delay_ms > 10_000 {
            return Err(ConfigError::Validation(
                "Error check delay cannot exceed 10 seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn error_check_delay(&self) -> Duration {
        Duration::from_millis(self.error_check_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PrinterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device, "/dev/ttyS0");
        assert_eq!(config.code_page, CodePage::Mazovia);
        assert_eq!(config.reply_timeout(), Duration::from_secs(5));
        assert_eq!(config.error_check_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let config: PrinterConfig = toml::from_str(
            r#"
            device = "/dev/ttyUSB0"
            code_page = "cp1250"
            error_handling = "silent"
            "#,
        )
        .unwrap();
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.code_page, CodePage::Windows1250);
        assert_eq!(config.error_handling, Some(ErrorHandling::Silent));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout_ms, 10_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PrinterConfig {
            device: "/dev/ttyS1".to_string(),
            baud_rate: 115200,
            error_handling: Some(ErrorHandling::AutoWithoutDisplay),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("error_handling = \"auto-without-display\""));
        let back: PrinterConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PrinterConfig::default();
        config.baud_rate = 4800;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = PrinterConfig::default();
        config.device = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = PrinterConfig::default();
        config.reply_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_code_page_is_parse_error() {
        let result = toml::from_str::<PrinterConfig>("code_page = \"latin1\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_try_load_missing_and_invalid() {
        let dir = std::env::temp_dir().join(format!("novitus-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.toml");
        assert!(matches!(PrinterConfig::try_load(&missing), ConfigLoadResult::Missing));

        let invalid = dir.join("invalid.toml");
        std::fs::write(&invalid, "baud_rate = 1").unwrap();
        assert!(matches!(
            PrinterConfig::try_load(&invalid),
            ConfigLoadResult::Invalid(ConfigError::Validation(_))
        ));

        let saved = dir.join("saved.toml");
        PrinterConfig::default().save(&saved).unwrap();
        assert!(matches!(
            PrinterConfig::try_load(&saved),
            ConfigLoadResult::Loaded(_)
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
