//! Region Latency Tester - Main CLI Application
//!
//! Probes game-server regions with ICMP echo and prints round-trip times,
//! once, as a batch, or on a recurring timer.

use clap::Parser;
use region_latency_tester::{app::App, cli::Cli, error::AppError};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is a bug; please report it together with the command you ran.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.format_for_console(use_color));

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - PING_TIMEOUT_MS must be 1..=60000, AUTO_PING_INTERVAL_MS 100..=3600000");
            eprintln!("  - DEFAULT_REGION must be a region name or code from `rpt list`");
        }
        AppError::Validation(_) => {
            eprintln!();
            eprintln!("Run `rpt --help` for usage and `rpt list` for region names.");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Raw ICMP sockets may need elevated privileges (root, CAP_NET_RAW,");
            eprintln!("    or net.ipv4.ping_group_range on Linux)");
            eprintln!("  - Firewalls often drop ICMP echo; try --timeout-ms with a larger value");
        }
        AppError::Persistence(_) => {
            eprintln!();
            eprintln!("Theme file help:");
            eprintln!("  - Check write permissions for the theme file's directory");
            eprintln!("  - Use --theme-file or THEME_FILE to choose another location");
        }
        _ => {}
    }
}
