//! Structured logging for the region latency tester
//!
//! Provides:
//! - Leveled, structured log entries with shared session context
//! - Console, JSON and compact output formats
//! - Probe and batch event logging with correlation IDs
//! - Error event logging for application faults
//!
//! Log output goes to stderr so probe results on stdout stay clean.

use crate::error::{AppError, Result};
use crate::models::{Config, ProbeOutcome, ProbeRecord};
use crate::types::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// Where formatted entries end up
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    /// Collect formatted lines in memory
    Memory(Arc<Mutex<Vec<String>>>),
    Discard,
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger with level filtering and multiple output formats
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    sink: LogSink,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            sink: LogSink::Stderr,
            name: name.into(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger following the configured verbosity
    pub fn with_config(name: impl Into<String>, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            sink: LogSink::Stderr,
            name: name.into(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// A logger that drops everything
    pub fn silent(name: impl Into<String>) -> Self {
        let mut logger = Self::new(name);
        logger.sink = LogSink::Discard;
        logger.min_level = LogLevel::Fatal;
        logger
    }

    /// A logger writing formatted lines into the returned buffer
    pub fn capturing(name: impl Into<String>, min_level: LogLevel) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut logger = Self::new(name);
        logger.min_level = min_level;
        logger.use_color = false;
        logger.sink = LogSink::Memory(Arc::clone(&buffer));
        (logger, buffer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.context.write().await.context_fields.insert(key.to_string(), json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            for (key, value) in &context.context_fields {
                entry.fields.insert(key.clone(), value.clone());
            }
        }

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
            LogFormat::Compact => self.format_compact(&entry),
        };

        match &self.sink {
            LogSink::Stderr => {
                let _ = writeln!(io::stderr(), "{}", output);
            }
            LogSink::Memory(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(output);
                }
            }
            LogSink::Discard => {}
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short = correlation_id.get(..8).unwrap_or(correlation_id);
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|_| {
            format!("{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}", entry.message)
        })
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        format!(
            "{} {} {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder for log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add the classified probe result
    pub fn outcome(self, outcome: &ProbeOutcome) -> Self {
        let builder = self.field("outcome", outcome.kind());
        match outcome {
            ProbeOutcome::Success { round_trip_ms } => builder.field("round_trip_ms", round_trip_ms),
            ProbeOutcome::Failure { reason } => builder.field("reason", reason),
            ProbeOutcome::Error { message } => builder.field("error", message),
            ProbeOutcome::Unmapped => builder,
        }
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Probe, batch and auto-ping events
#[derive(Debug, Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("PROBE", config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// A probe logger that drops everything
    pub fn silent() -> Self {
        Self::from_logger(Logger::silent("PROBE"))
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log one completed probe
    pub async fn log_probe(&self, region: &Region, address: Option<&str>, outcome: &ProbeOutcome, elapsed: Duration) {
        let level = if outcome.is_success() { LogLevel::Debug } else { LogLevel::Info };
        let message = format!("Probe {} -> {}", region, outcome);

        self.logger.log(level, &message)
            .field("region", region)
            .field("address", address)
            .field("elapsed_ms", elapsed.as_millis() as u64)
            .outcome(outcome)
            .log()
            .await;
    }

    /// Start a correlated batch and return its ID
    pub async fn log_batch_start(&self, region_count: usize, mode: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();

        self.logger.info(&format!("Probing {} regions ({})", region_count, mode))
            .correlation_id(&correlation_id)
            .field("region_count", region_count)
            .field("mode", mode)
            .field("operation_type", "batch_start")
            .log()
            .await;

        correlation_id
    }

    /// Log batch completion with aggregate timing
    pub async fn log_batch_summary(
        &self,
        correlation_id: &str,
        reported: usize,
        succeeded: usize,
        total_duration: Duration,
    ) {
        let message = format!(
            "Batch finished: {}/{} regions responded in {:.3}s",
            succeeded,
            reported,
            total_duration.as_secs_f64()
        );

        self.logger.info(&message)
            .correlation_id(correlation_id)
            .field("reported", reported)
            .field("succeeded", succeeded)
            .field("total_duration_ms", total_duration.as_millis() as u64)
            .field("operation_type", "batch_summary")
            .log()
            .await;
    }

    /// Log a record appended by the auto-ping timer
    pub async fn log_tick(&self, record: &ProbeRecord) {
        self.logger.debug(&format!("Auto-ping {} -> {}", record.region, record.outcome))
            .field("region", &record.region)
            .field("timestamp", record.timestamp)
            .outcome(&record.outcome)
            .log()
            .await;
    }

    /// Log an auto-ping start/stop transition
    pub async fn log_auto_ping_state(&self, enabled: bool, region: &Region) {
        let message = if enabled {
            format!("Auto-ping started for {}", region)
        } else {
            format!("Auto-ping stopped for {}", region)
        };

        self.logger.info(&message)
            .field("enabled", enabled)
            .field("region", region)
            .log()
            .await;
    }
}

/// Error event logger with enhanced context
#[derive(Debug, Clone)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("ERR", config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Log an application error with full context
    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).error_info(error);
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }

    /// Log a fault the application carries on from with a fallback
    pub async fn log_fallback(&self, error: &AppError, fallback: &str) {
        self.logger.warn(&format!("{}; {}", error, fallback))
            .error_info(error)
            .field("fallback", fallback)
            .log()
            .await;
    }
}

/// Hands out loggers sharing one session ID
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name, &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::from_logger(self.create_logger("ERR").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureReason;
    use std::str::FromStr;

    fn lines(buffer: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        buffer.lock().unwrap().clone()
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_logger_with_config() {
        let config = Config { debug: true, enable_color: false, ..Default::default() };
        let logger = Logger::with_config("TEST", &config);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);
        assert!(logger.include_location);

        let logger = Logger::with_config("TEST", &Config { verbose: true, ..Default::default() });
        assert_eq!(logger.min_level, LogLevel::Info);

        let logger = Logger::with_config("TEST", &Config::default());
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
    }

    #[tokio::test]
    async fn test_level_filtering() {
        let (logger, buffer) = Logger::capturing("TEST", LogLevel::Warn);

        logger.info("hidden").log().await;
        logger.warn("shown").log().await;

        let output = lines(&buffer);
        assert_eq!(output.len(), 1);
        assert!(output[0].contains("WARN"));
        assert!(output[0].contains("shown"));
    }

    #[tokio::test]
    async fn test_session_and_context_fields() {
        let (logger, buffer) = Logger::capturing("TEST", LogLevel::Info);
        logger.set_session_id("session-1".to_string()).await;
        logger.add_context_field("command", "all").await;

        logger.info("hello").log().await;

        let output = lines(&buffer);
        assert!(output[0].contains("session_id=\"session-1\""));
        assert!(output[0].contains("command=\"all\""));
    }

    #[tokio::test]
    async fn test_short_correlation_id_does_not_panic() {
        let (logger, buffer) = Logger::capturing("TEST", LogLevel::Info);
        logger.info("short").correlation_id("abc").log().await;
        assert!(lines(&buffer)[0].contains("[abc]"));
    }

    #[tokio::test]
    async fn test_outcome_fields() {
        let (logger, buffer) = Logger::capturing("TEST", LogLevel::Info);

        logger.info("ok").outcome(&ProbeOutcome::success(12)).log().await;
        logger.info("nope").outcome(&ProbeOutcome::failure(FailureReason::TimedOut)).log().await;

        let output = lines(&buffer);
        assert!(output[0].contains("round_trip_ms=12"));
        assert!(output[0].contains("outcome=\"success\""));
        assert!(output[1].contains("reason=\"TimedOut\""));
    }

    #[tokio::test]
    async fn test_json_format() {
        let (mut logger, buffer) = Logger::capturing("TEST", LogLevel::Info);
        logger.set_format(LogFormat::Json);

        logger.info("structured").field("region", "Europe (Ireland)").log().await;

        let output = lines(&buffer);
        let value: serde_json::Value = serde_json::from_str(&output[0]).unwrap();
        assert_eq!(value["message"], "structured");
        assert_eq!(value["fields"]["region"], "Europe (Ireland)");
        assert_eq!(value["level"], "Info");
    }

    #[tokio::test]
    async fn test_compact_format() {
        let (mut logger, buffer) = Logger::capturing("TEST", LogLevel::Info);
        logger.set_format(LogFormat::Compact);
        logger.error("broken").log().await;
        assert!(lines(&buffer)[0].contains(" E TEST: broken"));
    }

    #[tokio::test]
    async fn test_probe_logger_events() {
        let (logger, buffer) = Logger::capturing("PROBE", LogLevel::Debug);
        let probe_logger = ProbeLogger::from_logger(logger);
        let region = Region::from("US West (Oregon)");

        probe_logger
            .log_probe(&region, Some("gamelift.us-west-2.amazonaws.com"), &ProbeOutcome::success(80), Duration::from_millis(81))
            .await;
        let id = probe_logger.log_batch_start(11, "concurrent").await;
        probe_logger.log_batch_summary(&id, 11, 9, Duration::from_millis(1200)).await;
        probe_logger.log_auto_ping_state(true, &region).await;

        let output = lines(&buffer);
        assert_eq!(output.len(), 4);
        assert!(output[0].contains("Probe US West (Oregon) -> 80 ms"));
        assert!(output[1].contains("Probing 11 regions (concurrent)"));
        assert!(output[2].contains("9/11 regions responded"));
        assert!(output[3].contains("Auto-ping started"));
    }

    #[tokio::test]
    async fn test_error_logger() {
        let (logger, buffer) = Logger::capturing("ERR", LogLevel::Warn);
        let err_logger = ErrorEventLogger::from_logger(logger);
        let error = AppError::persistence("read-only file system");

        err_logger.log_error(&error, Some("Saving theme")).await;
        err_logger.log_fallback(&error, "keeping light theme").await;

        let output = lines(&buffer);
        assert!(output[0].contains("Saving theme: Persistence error: read-only file system"));
        assert!(output[0].contains("error_category=\"PERSIST\""));
        assert!(output[1].contains("keeping light theme"));
    }

    #[tokio::test]
    async fn test_silent_logger_drops_everything() {
        let logger = Logger::silent("TEST");
        assert!(!logger.would_log(LogLevel::Error));
        logger.error("nobody hears this").log().await;
    }

    #[tokio::test]
    async fn test_logger_factory_shares_session() {
        let factory = LoggerFactory::new(Config::default());
        let logger = factory.create_logger("TEST").await;
        assert_eq!(logger.name(), "TEST");

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some(factory.session_id()));
    }

    #[tokio::test]
    async fn test_macros_attach_location() {
        let (mut logger, buffer) = Logger::capturing("TEST", LogLevel::Debug);
        logger.set_format(LogFormat::Json);
        crate::log_debug!(logger, "value is {}", 7);

        let value: serde_json::Value = serde_json::from_str(&lines(&buffer)[0]).unwrap();
        assert_eq!(value["message"], "value is 7");
        assert!(value["location"]["file"].as_str().unwrap().ends_with("logging.rs"));
    }
}
