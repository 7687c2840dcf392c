//! Colored formatter implementation with terminal color support
//!
//! Wraps [`PlainFormatter`] and adds ANSI colors chosen from a
//! [`ColorScheme`]. The scheme follows the stored light/dark theme.

use super::formatter::{
    align_text, format_duration, format_percentage, format_timestamp, record_body, region_table_rows,
    Alignment, FormattingOptions, OutputFormatter, PlainFormatter, REGION_COLUMN_WIDTH,
};
use crate::{
    directory::EndpointDirectory,
    error::{AppError, Result},
    executor::BatchSummary,
    models::{ProbeOutcome, ProbeRecord},
    theme::ThemeMode,
    types::{PerformanceLevel, Region},
};
use colored::*;
use std::fmt::Write as _;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub border: Color,
}

impl ColorScheme {
    /// Palette readable on the background the theme implies
    pub fn for_theme(theme: ThemeMode) -> Self {
        match theme {
            ThemeMode::Light => Self {
                header: Color::Blue,
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
                info: Color::Cyan,
                highlight: Color::Magenta,
                muted: Color::BrightBlack,
                border: Color::BrightBlack,
            },
            ThemeMode::Dark => Self {
                header: Color::BrightBlue,
                success: Color::BrightGreen,
                warning: Color::BrightYellow,
                error: Color::BrightRed,
                info: Color::BrightCyan,
                highlight: Color::BrightMagenta,
                muted: Color::White,
                border: Color::White,
            },
        }
    }

    /// Color for a latency band
    pub fn performance(&self, level: PerformanceLevel) -> Color {
        match level {
            PerformanceLevel::Excellent => self.success,
            PerformanceLevel::Good => self.info,
            PerformanceLevel::Fair => self.warning,
            PerformanceLevel::Poor => self.highlight,
            PerformanceLevel::VeryPoor => self.error,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::for_theme(ThemeMode::default())
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter; the scheme comes from `options.theme`
    pub fn new(options: FormattingOptions) -> Self {
        let color_scheme = ColorScheme::for_theme(options.theme);
        Self::with_color_scheme(options, color_scheme)
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    pub fn color_scheme(&self) -> &ColorScheme {
        &self.color_scheme
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are off
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn outcome_color(&self, outcome: &ProbeOutcome) -> Color {
        match outcome {
            ProbeOutcome::Success { round_trip_ms } => self
                .color_scheme
                .performance(PerformanceLevel::from_round_trip(*round_trip_ms)),
            ProbeOutcome::Failure { .. } => self.color_scheme.warning,
            ProbeOutcome::Error { .. } => self.color_scheme.error,
            ProbeOutcome::Unmapped => self.color_scheme.muted,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.chars().count() + 4);
        let mut output = String::new();

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.emphasize(title, self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_outcome(&self, region: &Region, outcome: &ProbeOutcome) -> Result<String> {
        let name = align_text(region.name(), REGION_COLUMN_WIDTH, &Alignment::Left);
        let mut line = format!(
            "{}  {}",
            self.bold(&name),
            self.colorize(&outcome.to_string(), self.outcome_color(outcome))
        );
        if self.options.verbose_mode {
            if let Some(level) = outcome.performance_level() {
                line.push_str(&format!(" {}", self.dimmed(&format!("[{}]", level.description()))));
            }
        }
        Ok(line)
    }

    fn format_record(&self, record: &ProbeRecord) -> Result<String> {
        let stamp = format!("[{}]", format_timestamp(record));
        Ok(format!(
            "{} {}",
            self.dimmed(&stamp),
            self.colorize(&record_body(record), self.outcome_color(&record.outcome))
        ))
    }

    fn format_region_table(&self, directory: &EndpointDirectory) -> Result<String> {
        let (_, rows, complete) = region_table_rows(directory);
        if rows.is_empty() {
            return Ok(self.dimmed("No regions configured.").to_string());
        }

        // Pad before coloring so escape codes don't skew the columns
        let name_width = rows
            .iter()
            .map(|row| row[0].chars().count())
            .max()
            .unwrap_or(0);
        let code_width = rows
            .iter()
            .map(|row| row[1].chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        let mut output = String::new();
        writeln!(
            output,
            "{}  {}  {}",
            self.bold(&align_text("Region", name_width, &Alignment::Left)),
            self.bold(&align_text("Code", code_width, &Alignment::Left)),
            self.bold("Endpoint")
        )
        .map_err(|e| AppError::io(format!("Failed to format region table: {}", e)))?;

        for row in &rows {
            let endpoint = if directory.lookup(&Region::from(row[0].as_str())).is_some() {
                self.dimmed(&row[2])
            } else {
                self.colorize(&row[2], self.color_scheme.warning)
            };
            writeln!(
                output,
                "{}  {}  {}",
                align_text(&row[0], name_width, &Alignment::Left),
                self.colorize(&align_text(&row[1], code_width, &Alignment::Left), self.color_scheme.info),
                endpoint
            )
            .map_err(|e| AppError::io(format!("Failed to format region table: {}", e)))?;
        }

        if !complete {
            writeln!(
                output,
                "{}",
                self.colorize(
                    "Warning: some regions have no endpoint and will report as unmapped",
                    self.color_scheme.warning
                )
            )
            .map_err(|e| AppError::io(format!("Failed to format region table: {}", e)))?;
        }

        Ok(output.trim_end().to_string())
    }

    fn format_batch_summary(&self, summary: &BatchSummary) -> Result<String> {
        let mut output = String::new();

        let rate = format_percentage(summary.success_rate());
        let rate_color = if summary.succeeded == summary.total {
            self.color_scheme.success
        } else if summary.any_success() {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };

        writeln!(output, "{}", self.emphasize("Summary:", self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "  Regions probed:  {}", summary.total)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(
            output,
            "  Responded:       {} ({})",
            summary.succeeded,
            self.colorize(&rate, rate_color)
        )
        .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        if summary.failed > 0 {
            writeln!(
                output,
                "  Failed:          {}",
                self.colorize(&summary.failed.to_string(), self.color_scheme.warning)
            )
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if summary.errored > 0 {
            writeln!(
                output,
                "  Errors:          {}",
                self.colorize(&summary.errored.to_string(), self.color_scheme.error)
            )
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if summary.unmapped > 0 {
            writeln!(output, "  Unmapped:        {}", self.dimmed(&summary.unmapped.to_string()))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if let Some((region, rtt)) = &summary.fastest {
            let color = self.color_scheme.performance(PerformanceLevel::from_round_trip(*rtt));
            writeln!(
                output,
                "  Fastest:         {} ({})",
                self.bold(region.name()),
                self.colorize(&format!("{} ms", rtt), color)
            )
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if self.options.verbose_mode {
            if let Some((region, rtt)) = &summary.slowest {
                writeln!(output, "  Slowest:         {} ({} ms)", region, rtt)
                    .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
            }
        }
        write!(
            output,
            "  Total duration:  {}",
            self.dimmed(&format_duration(summary.duration.as_secs_f64() * 1000.0))
        )
        .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_auto_ping_status(&self, enabled: bool, region: &Region, records: usize) -> Result<String> {
        let state = if enabled {
            self.colorize("on", self.color_scheme.success)
        } else {
            self.colorize("off", self.color_scheme.muted)
        };
        Ok(format!(
            "Auto-ping {} | region: {} | records: {}",
            state,
            self.bold(region.name()),
            records
        ))
    }

    fn format_notice(&self, message: &str) -> Result<String> {
        Ok(self.colorize(&format!("-- {}", message), self.color_scheme.info).to_string())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Error:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("Warning:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(self.colorize(message, self.color_scheme.success).to_string())
    }
}

impl ColoredFormatter {
    /// Plain formatter sharing these options
    pub fn plain(&self) -> &PlainFormatter {
        &self.plain_formatter
    }

    pub fn set_colors_enabled(&mut self, enabled: bool) {
        self.options.enable_color = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;
    use chrono::Utc;

    fn formatter(enable_color: bool) -> ColoredFormatter {
        ColoredFormatter::new(FormattingOptions { enable_color, ..Default::default() })
    }

    #[test]
    fn test_theme_changes_scheme() {
        let light = ColorScheme::for_theme(ThemeMode::Light);
        let dark = ColorScheme::for_theme(ThemeMode::Dark);
        assert_eq!(light.success, Color::Green);
        assert_eq!(dark.success, Color::BrightGreen);
        assert_eq!(dark.performance(PerformanceLevel::VeryPoor), dark.error);
    }

    #[test]
    fn test_without_color_matches_plain_text() {
        let colored = formatter(false);
        let region = Region::from("Europe (Ireland)");
        let outcome = ProbeOutcome::failure(FailureReason::TimedOut);

        assert_eq!(
            colored.format_outcome(&region, &outcome).unwrap(),
            colored.plain().format_outcome(&region, &outcome).unwrap()
        );

        let record = ProbeRecord::new(region, Utc::now(), ProbeOutcome::success(12));
        assert_eq!(
            colored.format_record(&record).unwrap(),
            colored.plain().format_record(&record).unwrap()
        );
    }

    #[test]
    fn test_region_table_contains_every_region() {
        let directory = EndpointDirectory::builtin();
        let table = formatter(true).format_region_table(&directory).unwrap();
        for region in directory.regions() {
            assert!(table.contains(region.name()));
        }
        assert_eq!(table.lines().count(), directory.len() + 1);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut summary = BatchSummary::new();
        summary.record(&Region::from("A"), &ProbeOutcome::success(40));
        summary.record(&Region::from("B"), &ProbeOutcome::error("boom"));

        let text = formatter(false).format_batch_summary(&summary).unwrap();
        assert!(text.contains("Regions probed:  2"));
        assert!(text.contains("Errors:          1"));
        assert!(!text.contains("Failed:"));
        assert!(text.contains("Fastest:         A (40 ms)"));
    }

    #[test]
    fn test_status_and_messages() {
        let f = formatter(false);
        assert_eq!(
            f.format_auto_ping_status(false, &Region::from("X"), 0).unwrap(),
            "Auto-ping off | region: X | records: 0"
        );
        assert_eq!(f.format_error("bad").unwrap(), "Error: bad");
        assert_eq!(f.format_warning("odd").unwrap(), "Warning: odd");
    }
}
