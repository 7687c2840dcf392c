//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{Cli, Command},
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.build_from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from defaults, a key/value source and the CLI
    pub fn build_from_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(timeout_ms) = self.cli.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        if let Some(interval_ms) = self.cli.interval_ms {
            config.interval_ms = interval_ms;
        }

        if let Some(ref theme_file) = self.cli.theme_file {
            config.theme_file = theme_file.clone();
        }

        if self.cli.color {
            config.enable_color = true;
        }
        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        match &self.cli.command {
            Command::All { sequential, max_concurrency } => {
                config.sequential = *sequential;
                if let Some(max) = max_concurrency {
                    config.max_concurrency = *max;
                }
            }
            Command::Auto { region: Some(region), .. } => {
                config.default_region = Some(region.clone());
            }
            _ => {}
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Timeout: {}ms", config.timeout_ms));
    summary.push(format!("Auto-ping interval: {}ms", config.interval_ms));
    if config.sequential {
        summary.push("Batch mode: sequential".to_string());
    } else {
        summary.push(format!("Batch mode: concurrent (max {})", config.max_concurrency));
    }
    summary.push(format!(
        "Default region: {}",
        config.default_region.as_deref().unwrap_or("(first region)")
    ));
    summary.push(format!("Theme file: {}", config.theme_file.display()));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn parser(args: &[&str]) -> ConfigParser {
        ConfigParser::new(Cli::parse_from(args))
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = parser(&["rpt", "list"]).build_from_lookup(env_of(&[])).unwrap();

        assert_eq!(config.timeout_ms, 1000);
        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.max_concurrency, crate::defaults::DEFAULT_MAX_CONCURRENCY);
        assert!(!config.sequential);
        assert!(!config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_cli_overrides() {
        let config = parser(&[
            "rpt", "--timeout-ms", "300", "--interval-ms", "5000",
            "--theme-file", "theme.txt", "--no-color", "--verbose", "list",
        ])
        .build_from_lookup(env_of(&[]))
        .unwrap();

        assert_eq!(config.timeout_ms, 300);
        assert_eq!(config.interval_ms, 5000);
        assert_eq!(config.theme_file, PathBuf::from("theme.txt"));
        assert!(!config.enable_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let env = env_of(&[("PING_TIMEOUT_MS", "800"), ("ENABLE_COLOR", "false")]);
        let config = parser(&["rpt", "--timeout-ms", "200", "--color", "list"])
            .build_from_lookup(env)
            .unwrap();

        assert_eq!(config.timeout_ms, 200);
        assert!(config.enable_color);
    }

    #[test]
    fn test_env_applies_when_cli_silent() {
        let env = env_of(&[("PING_TIMEOUT_MS", "800"), ("MAX_CONCURRENCY", "3")]);
        let config = parser(&["rpt", "all"]).build_from_lookup(env).unwrap();

        assert_eq!(config.timeout_ms, 800);
        assert_eq!(config.max_concurrency, 3);
    }

    #[test]
    fn test_command_specific_overrides() {
        let config = parser(&["rpt", "all", "--max-concurrency", "2"])
            .build_from_lookup(env_of(&[]))
            .unwrap();
        assert_eq!(config.max_concurrency, 2);

        let config = parser(&["rpt", "all", "--sequential"])
            .build_from_lookup(env_of(&[]))
            .unwrap();
        assert!(config.sequential);

        let config = parser(&["rpt", "auto", "--region", "sa-east-1"])
            .build_from_lookup(env_of(&[("DEFAULT_REGION", "us-east-1")]))
            .unwrap();
        assert_eq!(config.default_region.as_deref(), Some("sa-east-1"));
    }

    #[test]
    fn test_invalid_final_config_rejected() {
        let result = parser(&["rpt", "auto", "--region", "Atlantis"]).build_from_lookup(env_of(&[]));
        assert!(result.is_err());

        let result = parser(&["rpt", "list"]).build_from_lookup(env_of(&[("AUTO_PING_INTERVAL_MS", "5")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());

        assert!(summary.contains("Timeout: 1000ms"));
        assert!(summary.contains("Auto-ping interval: 1000ms"));
        assert!(summary.contains("Batch mode: concurrent"));
        assert!(summary.contains("AppTheme.txt"));
    }
}
