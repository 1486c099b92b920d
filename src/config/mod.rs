//! Configuration System for mamdani
//!
//! Provides a configuration layer supporting:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple config file locations
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./mamdani.toml` - Project-local configuration
//! 2. `~/.config/mamdani/config.toml` - User configuration (XDG)
//! 3. `~/.mamdani/config.toml` - User configuration (legacy)
//! 4. `/etc/mamdani/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `MAMDANI_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `MAMDANI_FORMAT` - Result format (text, json)
//! - `MAMDANI_PRECISION` - Decimal places for text results
//! - `MAMDANI_STRICT_OPERATORS` - Reject unknown rule operators (true/false)
//!
//! # Example Configuration
//!
//! ```toml
//! # mamdani.toml
//!
//! [general]
//! log_level = "normal"
//! format = "text"
//! precision = 1
//!
//! [engine]
//! strict_operators = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MamdaniConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Inference engine settings
    pub engine: EngineConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
    /// Result output format
    pub format: OutputFormat,
    /// Decimal places used when printing crisp results as text
    pub precision: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            format: OutputFormat::Text,
            precision: 1,
        }
    }
}

/// Inference engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject rules with unrecognized operators instead of treating them as `and`
    pub strict_operators: bool,
}

// ============================================================================
// Enums
// ============================================================================

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Most verbose `tracing` level emitted at this setting
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Quiet => tracing::Level::ERROR,
            LogLevel::Normal => tracing::Level::WARN,
            LogLevel::Verbose => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl MamdaniConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations, then apply environment
    /// variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        paths.push(PathBuf::from("./mamdani.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("mamdani").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".mamdani").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/mamdani/config.toml"));

        paths
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any `MAMDANI_*` lookup; unparseable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("MAMDANI_LOG_LEVEL") {
            if let Some(level) = LogLevel::from_str(&val) {
                self.general.log_level = level;
            }
        }

        if let Some(val) = lookup("MAMDANI_FORMAT") {
            if let Some(format) = OutputFormat::from_str(&val) {
                self.general.format = format;
            }
        }

        if let Some(val) = lookup("MAMDANI_PRECISION") {
            if let Ok(precision) = val.parse::<usize>() {
                self.general.precision = precision;
            }
        }

        if let Some(val) = lookup("MAMDANI_STRICT_OPERATORS") {
            self.engine.strict_operators = val == "true" || val == "1" || val == "yes";
        }
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Generate a default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# mamdani configuration file

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Result format: text, json
format = "text"
# Decimal places for text results
precision = 1

[engine]
# Reject rules whose operators are not and / or / and_not
strict_operators = false
"#
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading/writing config file
    IoError(PathBuf, String),
    /// Parse error in config file
    ParseError(PathBuf, String),
    /// Serialization error
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::FuzzyError {
    fn from(err: ConfigError) -> Self {
        use crate::error::{ErrorCode, FuzzyError};
        let code = match &err {
            ConfigError::IoError(..) => ErrorCode::ConfigNotFound,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::SerializeError(_) => ErrorCode::ConfigError,
        };
        let message = match &err {
            ConfigError::IoError(path, _) | ConfigError::ParseError(path, _) => {
                format!("Failed to load configuration from {}", path.display())
            }
            ConfigError::SerializeError(_) => "Failed to serialize configuration".to_string(),
        };
        FuzzyError::new(code, message).with_cause(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
