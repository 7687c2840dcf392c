//! Configuration data model and validation

use crate::directory::EndpointDirectory;
use crate::types::{AppError, Region, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for a single probe
pub const MAX_TIMEOUT_MS: u64 = 60_000;
/// Auto-ping interval bounds
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 3_600_000;
/// Upper bound for probes in flight during a batch
pub const MAX_CONCURRENCY: usize = 64;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bound on a single probe, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Auto-ping tick period, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Probes in flight at once during a batch
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Probe regions one after another in a batch
    #[serde(default)]
    pub sequential: bool,

    /// Region selected when auto-ping starts; first region when unset
    #[serde(default)]
    pub default_region: Option<String>,

    /// Where the light/dark preference is stored
    #[serde(default = "default_theme_file")]
    pub theme_file: PathBuf,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            interval_ms: default_interval_ms(),
            max_concurrency: default_max_concurrency(),
            sequential: false,
            default_region: None,
            theme_file: default_theme_file(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get probe timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get auto-ping interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Region auto-ping starts on, resolved against the directory
    pub fn initial_region(&self, directory: &EndpointDirectory) -> Result<Region> {
        match &self.default_region {
            Some(name) => directory
                .resolve_name(name)
                .ok_or_else(|| AppError::config(format!("Unknown default region '{}'", name))),
            None => directory
                .regions()
                .first()
                .cloned()
                .ok_or_else(|| AppError::config("Endpoint directory has no regions")),
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(AppError::config(format!("Timeout cannot exceed {}ms", MAX_TIMEOUT_MS)));
        }

        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(AppError::config(format!(
                "Auto-ping interval must be between {}ms and {}ms",
                MIN_INTERVAL_MS, MAX_INTERVAL_MS
            )));
        }

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(AppError::config(format!(
                "Max concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }

        if self.theme_file.as_os_str().is_empty() {
            return Err(AppError::config("Theme file path cannot be empty"));
        }

        if let Some(name) = &self.default_region {
            if EndpointDirectory::builtin().resolve_name(name).is_none() {
                return Err(AppError::config(format!("Unknown default region '{}'", name)));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        self.merge_from_lookup(|key| std::env::var(key).ok())
    }

    /// Merge settings from any key/value source using the environment variable names
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("PING_TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Some(interval) = lookup("AUTO_PING_INTERVAL_MS") {
            self.interval_ms = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid AUTO_PING_INTERVAL_MS value '{}': {}", interval, e)))?;
        }

        if let Some(concurrency) = lookup("MAX_CONCURRENCY") {
            self.max_concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Some(region) = lookup("DEFAULT_REGION") {
            let region = region.trim();
            if !region.is_empty() {
                self.default_region = Some(region.to_string());
            }
        }

        if let Some(path) = lookup("THEME_FILE") {
            let path = path.trim();
            if !path.is_empty() {
                self.theme_file = PathBuf::from(path);
            }
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_interval_ms() -> u64 {
    crate::defaults::DEFAULT_INTERVAL.as_millis() as u64
}

fn default_max_concurrency() -> usize {
    crate::defaults::DEFAULT_MAX_CONCURRENCY
}

fn default_theme_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_THEME_FILE)
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_millis(1000));
        assert_eq!(config.interval(), Duration::from_millis(1000));
        assert_eq!(config.max_concurrency, 11);
        assert_eq!(config.theme_file, PathBuf::from("AppTheme.txt"));
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = Config { timeout_ms: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_upper_bound() {
        let config = Config { timeout_ms: MAX_TIMEOUT_MS + 1, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_bounds() {
        let too_fast = Config { interval_ms: 50, ..Default::default() };
        assert!(too_fast.validate().is_err());

        let slowest = Config { interval_ms: MAX_INTERVAL_MS, ..Default::default() };
        assert!(slowest.validate().is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let none = Config { max_concurrency: 0, ..Default::default() };
        assert!(none.validate().is_err());

        let too_many = Config { max_concurrency: MAX_CONCURRENCY + 1, ..Default::default() };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_unknown_default_region_invalid() {
        let config = Config {
            default_region: Some("Atlantis".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_initial_region() {
        let directory = EndpointDirectory::builtin();

        let config = Config::default();
        assert_eq!(config.initial_region(&directory).unwrap().name(), "Asia Pacific (Hong Kong)");

        let config = Config {
            default_region: Some("eu-west-1".to_string()),
            ..Default::default()
        };
        assert_eq!(config.initial_region(&directory).unwrap().name(), "Europe (Ireland)");
    }

    #[test]
    fn test_merge_from_lookup() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("PING_TIMEOUT_MS", "750"),
                ("AUTO_PING_INTERVAL_MS", "2000"),
                ("MAX_CONCURRENCY", "4"),
                ("DEFAULT_REGION", "us-east-1"),
                ("THEME_FILE", "/tmp/theme.txt"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.timeout_ms, 750);
        assert_eq!(config.interval_ms, 2000);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.default_region.as_deref(), Some("us-east-1"));
        assert_eq!(config.theme_file, PathBuf::from("/tmp/theme.txt"));
        assert!(!config.enable_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_rejects_garbage() {
        let mut config = Config::default();
        let result = config.merge_from_lookup(lookup_from(&[("PING_TIMEOUT_MS", "soon")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PING_TIMEOUT_MS"));
    }

    #[test]
    fn test_merge_ignores_blank_paths() {
        let mut config = Config::default();
        config
            .merge_from_lookup(lookup_from(&[("THEME_FILE", "  "), ("DEFAULT_REGION", "")]))
            .unwrap();
        assert_eq!(config.theme_file, PathBuf::from("AppTheme.txt"));
        assert!(config.default_region.is_none());
    }
}
