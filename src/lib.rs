//! Region Latency Tester
//!
//! Measures ICMP round-trip latency to a fixed set of named game-server
//! regions. Regions can be probed one at a time, all together as a batch,
//! or repeatedly on a timer that builds a timestamped log for one
//! selected region.

pub mod app;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod prober;
pub mod report;
pub mod scheduler;
pub mod theme;
pub mod types;

// Re-export commonly used types
pub use directory::EndpointDirectory;
pub use error::{AppError, Result};
pub use executor::{BatchMode, BatchRunner, BatchSummary};
pub use models::{Config, ProbeOutcome, ProbeRecord};
pub use prober::{probe_region, IcmpProber, Prober};
pub use report::{ConsoleSurface, ReportingSurface};
pub use scheduler::{AutoPingState, ProbeLog, Scheduler};
pub use theme::{ThemeMode, ThemeStore};
pub use types::{FailureReason, Region};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata injected by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Single echo attempt bound
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
    /// Auto-ping tick period
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
    /// All built-in regions in flight at once
    pub const DEFAULT_MAX_CONCURRENCY: usize = 11;
    pub const DEFAULT_THEME_FILE: &str = "AppTheme.txt";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    /// Echo payload size, matching the common 32-byte ping default
    pub const ECHO_PAYLOAD_SIZE: usize = 32;
}
