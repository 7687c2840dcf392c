//! Environment variable handling and .env file management

use crate::directory::EndpointDirectory;
use crate::error::{AppError, Result};
use crate::models::config::{MAX_CONCURRENCY, MAX_INTERVAL_MS, MAX_TIMEOUT_MS, MIN_INTERVAL_MS};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Region Ping Tester Configuration
#
# Values here act as defaults and can be overridden by command-line
# arguments.

# Probe timeout in milliseconds (1-60000)
# PING_TIMEOUT_MS=1000

# Auto-ping interval in milliseconds (100-3600000)
# AUTO_PING_INTERVAL_MS=1000

# Probes in flight at once when probing all regions (1-64)
# MAX_CONCURRENCY=11

# Region auto-ping starts on (display name or code)
# DEFAULT_REGION=us-east-1

# Where the light/dark theme preference is stored
# THEME_FILE=AppTheme.txt

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PING_TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT_MS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > MAX_TIMEOUT_MS {
                    return Err(AppError::config(format!(
                        "PING_TIMEOUT_MS must be between 1 and {}, got: {}",
                        MAX_TIMEOUT_MS, timeout
                    )));
                }
            }
            "AUTO_PING_INTERVAL_MS" => {
                let interval: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid AUTO_PING_INTERVAL_MS value '{}': {}", value, e)))?;
                if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
                    return Err(AppError::config(format!(
                        "AUTO_PING_INTERVAL_MS must be between {} and {}, got: {}",
                        MIN_INTERVAL_MS, MAX_INTERVAL_MS, interval
                    )));
                }
            }
            "MAX_CONCURRENCY" => {
                let max: usize = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid MAX_CONCURRENCY value '{}': {}", value, e)))?;
                if max == 0 || max > MAX_CONCURRENCY {
                    return Err(AppError::config(format!(
                        "MAX_CONCURRENCY must be between 1 and {}, got: {}",
                        MAX_CONCURRENCY, max
                    )));
                }
            }
            "DEFAULT_REGION" => {
                if EndpointDirectory::builtin().resolve_name(value).is_none() {
                    return Err(AppError::config(format!("Unknown DEFAULT_REGION '{}'", value)));
                }
            }
            "THEME_FILE" => {
                if value.is_empty() {
                    return Err(AppError::config("THEME_FILE cannot be empty"));
                }
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PING_TIMEOUT_MS", "Probe timeout in milliseconds (1-60000)", "1000"),
            ("AUTO_PING_INTERVAL_MS", "Auto-ping interval in milliseconds (100-3600000)", "1000"),
            ("MAX_CONCURRENCY", "Probes in flight when probing all regions (1-64)", "11"),
            ("DEFAULT_REGION", "Region auto-ping starts on", "us-east-1"),
            ("THEME_FILE", "Theme preference file", "AppTheme.txt"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Validate `KEY=value` lines of a .env file, returning one warning per bad line
    pub fn check_env_content(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                Self::validate_env_var(key.trim(), value)
                    .err()
                    .map(|e| format!("Line '{}': {}", line, e))
            })
            .collect()
    }
}
