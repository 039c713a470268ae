//! Logging setup for applications embedding ELTC
//!
//! The library itself only emits `tracing` events. Front ends call one of the
//! initializers here once at startup to install a subscriber.
//!
//! # Examples
//!
//! ```no_run
//! use libeltc::logging::{LoggingConfig, LogFormat};
//!
//! # fn main() -> libeltc::Result<()> {
//! // Either an explicit format
//! LoggingConfig::new(LogFormat::Json, "info".to_string()).try_init()?;
//!
//! // or the ELTC_LOG_FORMAT / ELTC_LOG_LEVEL environment variables
//! libeltc::logging::init_default()?;
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{ConfigError, EltcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. "info" or "libeltc=debug,warn"
    pub level: String,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String) -> Self {
        Self { format, level }
    }

    /// Build from the `[logging]` section of the config file
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self> {
        let format = settings
            .format
            .parse::<LogFormat>()
            .map_err(|message| ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                message,
            })?;

        EnvFilter::try_new(&settings.level).map_err(|e| ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::new(format, settings.level.clone()))
    }

    /// Install a global subscriber writing to stderr
    ///
    /// `RUST_LOG`, when set, takes precedence over the configured level.
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already installed.
    pub fn try_init(&self) -> Result<()> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let output = match self.format {
            // One JSON object per line, with source locations for log shippers
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_line_number(true)
                .with_file(true)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_line_number(true)
                .with_file(true)
                .boxed(),
            LogFormat::Text => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(output)
            .with(filter)
            .try_init()
            .map_err(|e| EltcError::Logging(e.to_string()))
    }
}

/// Install a subscriber from `ELTC_LOG_FORMAT` and `ELTC_LOG_LEVEL`
///
/// Falls back to text format with info level if they are not set.
pub fn init_default() -> Result<()> {
    let format = std::env::var("ELTC_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);

    let level = std::env::var("ELTC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    LoggingConfig::new(format, level).try_init()
}
