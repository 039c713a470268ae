//! Configuration management for ELTC
//!
//! Configuration is an optional TOML file. Every key has a default, so a
//! missing file or an empty one yields a working configuration:
//!
//! ```toml
//! [model]
//! fetch_timeout = "30s"   # any humantime duration, or "off"
//!
//! [logging]
//! format = "text"         # text, json or pretty
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::logging::LoggingConfig;

/// Fetch timeout used when none is configured
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub logging: LoggingSettings,
}

/// `[model]` section: behaviour of the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Upper bound for every API call, e.g. "30s" or "2m"; "off" disables it
    pub fetch_timeout: String,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: String,
    pub level: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: humantime::format_duration(DEFAULT_FETCH_TIMEOUT).to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            level: "info".to_string(),
        }
    }
}

impl ModelConfig {
    /// Parsed fetch timeout; `None` when disabled
    pub fn fetch_timeout(&self) -> Result<Option<Duration>> {
        let value = self.fetch_timeout.trim();
        if value.eq_ignore_ascii_case("off") {
            return Ok(None);
        }

        let timeout = humantime::parse_duration(value).map_err(|e| ConfigError::InvalidValue {
            field: "model.fetch_timeout".to_string(),
            message: format!("'{}': {}", value, e),
        })?;

        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "model.fetch_timeout".to_string(),
                message: "must be greater than zero (use \"off\" to disable)".to_string(),
            }
            .into());
        }

        Ok(Some(timeout))
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Fails if the file does not exist; see [`Config::load_or_default`].
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, falling back to
    /// defaults when there is no file
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                path = %config_path.display(),
                "No config file, using defaults"
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.model.fetch_timeout()?;
        LoggingConfig::from_settings(&self.logging)?;
        Ok(())
    }
}

/// Resolve the configuration file path: `ELTC_CONFIG`, else the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("ELTC_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("eltc").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EltcError;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.model.fetch_timeout().unwrap(), Some(DEFAULT_FETCH_TIMEOUT));
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[model]
fetch_timeout = "1m 30s"

[logging]
format = "json"
level = "debug"
"#,
        );

        let config = Config::load_from_path(file.path()).unwrap();

        assert_eq!(
            config.model.fetch_timeout().unwrap(),
            Some(Duration::from_secs(90))
        );
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = write_config("[logging]\nlevel = \"warn\"\n");

        let config = Config::load_from_path(file.path()).unwrap();

        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = write_config("");

        assert_eq!(Config::load_from_path(file.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_fetch_timeout_off() {
        let config = ModelConfig {
            fetch_timeout: "off".to_string(),
        };

        assert_eq!(config.fetch_timeout().unwrap(), None);
    }

    #[test]
    fn test_invalid_fetch_timeout() {
        let file = write_config("[model]\nfetch_timeout = \"soon\"\n");

        let err = Config::load_from_path(file.path()).unwrap_err();

        assert!(matches!(
            err,
            EltcError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "model.fetch_timeout"
        ));
    }

    #[test]
    fn test_zero_fetch_timeout_rejected() {
        let config = ModelConfig {
            fetch_timeout: "0s".to_string(),
        };

        assert!(config.fetch_timeout().is_err());
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let file = write_config("[logging]\nformat = \"xml\"\n");

        let err = Config::load_from_path(file.path()).unwrap_err();

        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[model\nfetch_timeout = ");

        let err = Config::load_from_path(file.path()).unwrap_err();

        assert!(matches!(err, EltcError::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::load_from_path(&dir.path().join("missing.toml")).unwrap_err();

        assert!(matches!(err, EltcError::Config(ConfigError::ReadError(_))));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        std::env::set_var("ELTC_CONFIG", "/tmp/eltc-test/config.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("ELTC_CONFIG");

        assert_eq!(path, PathBuf::from("/tmp/eltc-test/config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::env::set_var("ELTC_CONFIG", path.to_str().unwrap());
        let config = Config::load_or_default();
        std::env::remove_var("ELTC_CONFIG");

        assert_eq!(config.unwrap(), Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env_path() {
        let file = write_config("[model]\nfetch_timeout = \"5s\"\n");
        std::env::set_var("ELTC_CONFIG", file.path().to_str().unwrap());
        let config = Config::load();
        std::env::remove_var("ELTC_CONFIG");

        assert_eq!(
            config.unwrap().model.fetch_timeout().unwrap(),
            Some(Duration::from_secs(5))
        );
    }
}
