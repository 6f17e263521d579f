//! Configuration management for stack-explorer.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Navigation engine settings.
    pub explorer: ExplorerSection,
    /// Status display settings.
    pub status: StatusSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Navigation engine section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSection {
    /// Capture the caller chain when a session starts.
    pub capture_on_start: bool,
    /// Frame a freshly captured stack starts on.
    pub initial_frame: usize,
}

impl Default for ExplorerSection {
    fn default() -> Self {
        Self {
            capture_on_start: true,
            initial_frame: 0,
        }
    }
}

/// Status display section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSection {
    /// Show the frame type line when the frame has one.
    pub show_frame_type: bool,
}

impl Default for StatusSection {
    fn default() -> Self {
        Self {
            show_frame_type: true,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var("STACK_EXPLORER_CAPTURE") {
            self.explorer.capture_on_start = parse_bool("STACK_EXPLORER_CAPTURE", &value)?;
        }

        if let Ok(value) = std::env::var("STACK_EXPLORER_INITIAL_FRAME") {
            self.explorer.initial_frame = value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STACK_EXPLORER_INITIAL_FRAME", value))?;
        }

        if let Ok(level) = std::env::var("STACK_EXPLORER_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(frame) = args.initial_frame {
            self.explorer.initial_frame = frame;
        }

        if args.no_capture {
            self.explorer.capture_on_start = false;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.apply_args(args);

        Ok(config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(name, value.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file: {0}")]
    Io(std::io::Error),
    /// JSON parsing error.
    #[error("failed to parse config file: {0}")]
    Json(serde_json::Error),
    /// Environment variable with an unusable value.
    #[error("invalid value for {0}: '{1}'")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.explorer.capture_on_start);
        assert_eq!(config.explorer.initial_frame, 0);
        assert!(config.status.show_frame_type);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "explorer": {
                "capture_on_start": false,
                "initial_frame": 2
            },
            "status": { "show_frame_type": false },
            "logging": { "level": "debug" }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.explorer.capture_on_start);
        assert_eq!(config.explorer.initial_frame, 2);
        assert!(!config.status.show_frame_type);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            initial_frame: Some(3),
            no_capture: true,
            log_level: Some("trace".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.explorer.initial_frame, 3);
        assert!(!config.explorer.capture_on_start);
        assert_eq!(config.log_filter(), "trace");
    }

    #[test]
    fn test_apply_args_defaults_keep_config() {
        let mut config = Config::default();
        config.explorer.initial_frame = 4;

        config.apply_args(&Args::default());

        assert_eq!(config.explorer.initial_frame, 4);
        assert!(config.explorer.capture_on_start);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "yes").unwrap());
        assert!(parse_bool("X", " TRUE ").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"initial_frame\""));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
