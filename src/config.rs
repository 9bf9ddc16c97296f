//! Configuration file management for certlister.
//!
//! This module handles loading, parsing, and merging configuration from TOML files
//! and command-line arguments.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (certlister.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! hosts = ["example.com", "example.com:8443"]
//! input = "hosts.txt"
//! output = "csv"
//! output_file = "cert_out.csv"
//! timeout_secs = 5
//! workers = 4
//! exit_code = 2
//! ```

use crate::fetch::DEFAULT_TIMEOUT_SECS;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "certlister.toml";

/// Main configuration structure for certlister.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI arguments.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Hosts to check, in addition to those read from `input`
    pub hosts: Option<Vec<String>>,
    /// File with one host entry per line
    pub input: Option<String>,
    /// Output format: json, csv, text
    pub output: Option<String>,
    /// Write output here instead of stdout
    pub output_file: Option<String>,
    /// Connect and handshake timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Number of hosts checked at the same time
    pub workers: Option<usize>,
    /// Exit code to use when at least one host could not be checked
    pub exit_code: Option<i32>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use certlister::config::Config;
    /// let config = Config::from_file("certlister.toml")?;
    /// # Ok::<(), certlister::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Creates a configuration with the built-in defaults.
    ///
    /// - `output`: "json"
    /// - `timeout_secs`: 10
    /// - `workers`: 1 (hosts are checked one after the other)
    /// - `exit_code`: 1
    pub fn defaults() -> Self {
        Config {
            hosts: None,
            input: None,
            output: Some(OutputFormat::Json.to_string()),
            output_file: None,
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            workers: Some(1),
            exit_code: Some(1),
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// For each field, if the `other` config has a value (Some), it overrides
    /// this config's value. If the `other` value is None, keeps the current value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.hosts.is_some() {
            self.hosts = other.hosts;
        }
        if other.input.is_some() {
            self.input = other.input;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.output_file.is_some() {
            self.output_file = other.output_file;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.workers.is_some() {
            self.workers = other.workers;
        }
        if other.exit_code.is_some() {
            self.exit_code = other.exit_code;
        }
        self
    }

    /// Checks the values that have a restricted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Validation(
                "workers must be greater than zero".to_string(),
            ));
        }
        if let Some(output) = &self.output {
            OutputFormat::from_str(output).map_err(|_| {
                ConfigError::Validation(format!(
                    "unknown output format '{}', expected json, csv or text",
                    output
                ))
            })?;
        }
        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
            .as_deref()
            .and_then(|o| OutputFormat::from_str(o).ok())
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(1)
    }

    pub fn failure_exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// ```
    /// # use certlister::config::Config;
    /// let example = Config::example_toml();
    /// assert!(example.contains("hosts"));
    /// ```
    pub fn example_toml() -> String {
        let example = Config {
            hosts: Some(vec![
                "example.com".to_string(),
                "example.com:8443".to_string(),
                "[2001:db8::1]:443".to_string(),
            ]),
            input: Some("hosts.txt".to_string()),
            output: Some("csv".to_string()),
            output_file: Some("cert_out.csv".to_string()),
            timeout_secs: Some(5),
            workers: Some(4),
            exit_code: Some(2),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (invalid values)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
