//! Command-line interface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Region Ping Tester - measure ICMP round-trip latency to game-server regions
#[derive(Parser, Debug, Clone)]
#[command(name = "rpt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Probe timeout in milliseconds
    #[arg(long, global = true, value_name = "MS", value_parser = parse_millis)]
    pub timeout_ms: Option<u64>,

    /// Auto-ping interval in milliseconds
    #[arg(long, global = true, value_name = "MS", value_parser = parse_millis)]
    pub interval_ms: Option<u64>,

    /// Theme preference file
    #[arg(long, global = true, value_name = "PATH")]
    pub theme_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List known regions with their codes and endpoints
    List,

    /// Probe one or more regions once (display name or code)
    Probe {
        /// Regions to probe
        #[arg(required = true, value_name = "REGION")]
        regions: Vec<String>,
    },

    /// Probe every region once and print a summary
    All {
        /// Probe regions one after another in display order
        #[arg(long)]
        sequential: bool,

        /// Number of probes in flight at once
        #[arg(long, value_name = "N", conflicts_with = "sequential")]
        max_concurrency: Option<usize>,
    },

    /// Probe the selected region on a recurring timer
    Auto {
        /// Region to start with (display name or code)
        #[arg(long, short)]
        region: Option<String>,

        /// Stop after this many records
        #[arg(long, short = 'n', value_name = "N")]
        count: Option<usize>,
    },

    /// Show or change the persisted light/dark theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

/// What the `theme` command does
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Toggle,
    Dark,
    Light,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        match &self.command {
            Command::All { max_concurrency: Some(0), .. } => {
                return Err("--max-concurrency must be at least 1".to_string());
            }
            Command::Auto { count: Some(0), .. } => {
                return Err("--count must be at least 1".to_string());
            }
            Command::Probe { regions } if regions.iter().any(|r| r.trim().is_empty()) => {
                return Err("Region names cannot be empty".to_string());
            }
            _ => {}
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a strictly positive millisecond count
fn parse_millis(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Duration must be greater than 0".to_string())
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
pub(crate) fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
