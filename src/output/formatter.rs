//! Core formatting trait and the plain text implementation
//!
//! Every formatter method returns the text for one display element; the
//! caller decides where it goes.

use crate::{
    directory::EndpointDirectory,
    error::{AppError, Result},
    executor::BatchSummary,
    models::{ProbeOutcome, ProbeRecord},
    theme::ThemeMode,
    types::Region,
};
use chrono::Local;
use std::fmt::Write as _;

/// Width the region column is padded to in outcome lines
pub const REGION_COLUMN_WIDTH: usize = 28;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// One line for a single probe result
    fn format_outcome(&self, region: &Region, outcome: &ProbeOutcome) -> Result<String>;

    /// One timestamped auto-ping log line
    fn format_record(&self, record: &ProbeRecord) -> Result<String>;

    /// Table of regions with their codes and endpoints
    fn format_region_table(&self, directory: &EndpointDirectory) -> Result<String>;

    /// Totals after probing a batch of regions
    fn format_batch_summary(&self, summary: &BatchSummary) -> Result<String>;

    /// Current auto-ping state
    fn format_auto_ping_status(&self, enabled: bool, region: &Region, records: usize) -> Result<String>;

    fn format_notice(&self, message: &str) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Palette for colored output
    pub theme: ThemeMode,
    pub verbose_mode: bool,
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            theme: ThemeMode::Light,
            verbose_mode: false,
            table_borders: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

impl Column {
    pub fn left(header: &str, min_width: usize, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment: Alignment::Left,
            min_width,
            max_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&widths));
        }

        output.trim_end().to_string()
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        format
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let content = rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                content
                    .max(column.min_width)
                    .max(column.header.chars().count())
                    .min(column.max_width)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format
                .columns
                .get(idx)
                .map(|c| &c.alignment)
                .unwrap_or(&Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }
}

/// Align text within specified width, truncating when too long
pub(crate) fn align_text(text: &str, width: usize, alignment: &Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(padding - left_pad))
        }
    }
}

/// Local wall-clock time as shown in the auto-ping log
pub(crate) fn format_timestamp(record: &ProbeRecord) -> String {
    record
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Log line body without the timestamp
pub(crate) fn record_body(record: &ProbeRecord) -> String {
    match &record.outcome {
        ProbeOutcome::Success { round_trip_ms } => format!("{}: {} ms", record.region, round_trip_ms),
        ProbeOutcome::Failure { reason } => format!("{} Failed: {}", record.region, reason),
        ProbeOutcome::Error { message } => format!("{} Error during auto-pinging: {}", record.region, message),
        ProbeOutcome::Unmapped => format!("{}: no endpoint configured", record.region),
    }
}

/// `1234` -> `1.23s`, `87` -> `87ms`
pub(crate) fn format_duration(duration_ms: f64) -> String {
    if duration_ms < 1000.0 {
        format!("{:.0}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.2}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0) as u32;
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

pub(crate) fn format_percentage(percentage: f64) -> String {
    if percentage >= 99.95 {
        "100.0%".to_string()
    } else if percentage < 0.05 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", percentage)
    }
}

pub(crate) fn region_table_rows(directory: &EndpointDirectory) -> (TableFormat, Vec<RowData>, bool) {
    let rows: Vec<RowData> = directory
        .regions()
        .iter()
        .map(|region| {
            vec![
                region.to_string(),
                directory.code(region).unwrap_or("-").to_string(),
                directory.lookup(region).unwrap_or("(none)").to_string(),
            ]
        })
        .collect();

    let format = TableFormat {
        columns: vec![
            Column::left("Region", 12, 40),
            Column::left("Code", 6, 20),
            Column::left("Endpoint", 10, 60),
        ],
        show_borders: true,
        show_header: true,
    };

    let complete = directory.validate().is_ok();
    (format, rows, complete)
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);

        writeln!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", title)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_outcome(&self, region: &Region, outcome: &ProbeOutcome) -> Result<String> {
        let mut line = format!(
            "{}  {}",
            align_text(region.name(), REGION_COLUMN_WIDTH, &Alignment::Left),
            outcome
        );
        if self.options.verbose_mode {
            if let Some(level) = outcome.performance_level() {
                line.push_str(&format!(" [{}]", level.description()));
            }
        }
        Ok(line)
    }

    fn format_record(&self, record: &ProbeRecord) -> Result<String> {
        Ok(format!("[{}] {}", format_timestamp(record), record_body(record)))
    }

    fn format_region_table(&self, directory: &EndpointDirectory) -> Result<String> {
        let (mut format, rows, complete) = region_table_rows(directory);
        if rows.is_empty() {
            return Ok("No regions configured.".to_string());
        }
        format.show_borders = self.options.table_borders;

        let mut output = self.create_table(&format, &rows);
        if !complete {
            output.push_str("\nWarning: some regions have no endpoint and will report as unmapped");
        }
        Ok(output)
    }

    fn format_batch_summary(&self, summary: &BatchSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Summary:")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "--------")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Regions probed:   {}", summary.total)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Responded:        {} ({})", summary.succeeded, format_percentage(summary.success_rate()))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Failed:           {}", summary.failed)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Errors:           {}", summary.errored)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        if summary.unmapped > 0 {
            writeln!(output, "Unmapped:         {}", summary.unmapped)
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if let Some((region, rtt)) = &summary.fastest {
            writeln!(output, "Fastest:          {} ({} ms)", region, rtt)
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        if self.options.verbose_mode {
            if let Some((region, rtt)) = &summary.slowest {
                writeln!(output, "Slowest:          {} ({} ms)", region, rtt)
                    .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
            }
        }
        write!(output, "Total duration:   {}", format_duration(summary.duration.as_secs_f64() * 1000.0))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_auto_ping_status(&self, enabled: bool, region: &Region, records: usize) -> Result<String> {
        Ok(format!(
            "Auto-ping {} | region: {} | records: {}",
            if enabled { "on" } else { "off" },
            region,
            records
        ))
    }

    fn format_notice(&self, message: &str) -> Result<String> {
        Ok(format!("-- {}", message))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("Error: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Warning: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::time::Duration;

    fn plain() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions { enable_color: false, ..Default::default() })
    }

    #[test]
    fn test_header() {
        let header = plain().format_header("Regions").unwrap();
        assert_eq!(header, "===========\n  Regions  \n===========");
    }

    #[test]
    fn test_outcome_line_pads_region() {
        let line = plain()
            .format_outcome(&Region::from("Europe (Ireland)"), &ProbeOutcome::success(42))
            .unwrap();
        assert!(line.starts_with("Europe (Ireland)"));
        assert!(line.ends_with("  42 ms"));
        assert_eq!(line.chars().count(), REGION_COLUMN_WIDTH + 2 + "42 ms".len());
    }

    #[test]
    fn test_verbose_outcome_includes_level() {
        let formatter = PlainFormatter::new(FormattingOptions { verbose_mode: true, ..Default::default() });
        let line = formatter.format_outcome(&Region::from("X"), &ProbeOutcome::success(20)).unwrap();
        assert!(line.ends_with("[Excellent]"));
    }

    #[test]
    fn test_record_lines() {
        let region = Region::from("US East (North Virginia)");
        let formatter = plain();

        let ok = ProbeRecord::new(region.clone(), Utc::now(), ProbeOutcome::success(95));
        let line = formatter.format_record(&ok).unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] US East (North Virginia): 95 ms"));

        let failed = ProbeRecord::new(region.clone(), Utc::now(), ProbeOutcome::failure(FailureReason::TimedOut));
        assert!(formatter.format_record(&failed).unwrap().ends_with("US East (North Virginia) Failed: TimedOut"));

        let errored = ProbeRecord::new(region, Utc::now(), ProbeOutcome::error("socket closed"));
        assert!(formatter
            .format_record(&errored)
            .unwrap()
            .ends_with("Error during auto-pinging: socket closed"));
    }

    #[test]
    fn test_region_table_lists_every_region() {
        let directory = EndpointDirectory::builtin();
        let table = plain().format_region_table(&directory).unwrap();

        for region in directory.regions() {
            assert!(table.contains(region.name()), "missing {}", region);
        }
        assert!(table.contains("ap-northeast-2"));
        assert!(table.starts_with("+"));
        assert!(!table.contains("Warning"));
    }

    #[test]
    fn test_region_table_alignment_with_accents() {
        let directory = EndpointDirectory::builtin();
        let table = plain().format_region_table(&directory).unwrap();
        let widths: Vec<usize> = table.lines().map(|line| line.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "ragged table: {:?}", widths);
    }

    #[test]
    fn test_region_table_flags_incomplete_directory() {
        let mut endpoints = HashMap::new();
        endpoints.insert(Region::from("A"), "a.example".to_string());
        let directory = EndpointDirectory::from_parts(vec![Region::from("A"), Region::from("B")], endpoints);

        let table = plain().format_region_table(&directory).unwrap();
        assert!(table.contains("(none)"));
        assert!(table.contains("Warning"));
    }

    #[test]
    fn test_batch_summary() {
        let mut summary = BatchSummary::new();
        summary.record(&Region::from("Fast"), &ProbeOutcome::success(10));
        summary.record(&Region::from("Dead"), &ProbeOutcome::failure(FailureReason::TimedOut));
        summary.duration = Duration::from_millis(1500);

        let text = plain().format_batch_summary(&summary).unwrap();
        assert!(text.contains("Regions probed:   2"));
        assert!(text.contains("Responded:        1 (50.0%)"));
        assert!(text.contains("Fastest:          Fast (10 ms)"));
        assert!(text.contains("Total duration:   1.50s"));
        assert!(!text.contains("Unmapped"));
    }

    #[test]
    fn test_status_line() {
        let line = plain().format_auto_ping_status(true, &Region::from("Europe (Frankfurt)"), 3).unwrap();
        assert_eq!(line, "Auto-ping on | region: Europe (Frankfurt) | records: 3");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(format_duration(87.0), "87ms");
        assert_eq!(format_duration(61_500.0), "1m1.5s");
        assert_eq!(format_percentage(100.0), "100.0%");
        assert_eq!(align_text("abc", 5, &Alignment::Right), "  abc");
        assert_eq!(align_text("abc", 5, &Alignment::Center), " abc ");
        assert_eq!(align_text("abcdef", 3, &Alignment::Left), "abc");
    }
}
