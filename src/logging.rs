//! Structured logging system for PingPanic
//!
//! This module provides:
//! - Structured logging with multiple levels and contexts
//! - Console, JSON and compact output formats
//! - Session and correlation IDs for grouping related events
//! - Specialized loggers for the simulation and the geolocation lookup

use crate::error::{AppError, Result};
use crate::models::{Config, TestOutcome, UserInfo};
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
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
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m", // White
            LogLevel::Debug => "\x1b[36m", // Cyan
            LogLevel::Info => "\x1b[32m",  // Green
            LogLevel::Warn => "\x1b[33m",  // Yellow
            LogLevel::Error => "\x1b[31m", // Red
        }
    }

    /// Reset ANSI color code
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
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when the entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID tying together events of one operation
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    /// Source file name
    pub file: String,
    /// Line number
    pub line: u32,
    /// Module path
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

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    current_correlation_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Whether to include location information
    include_location: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Shared context storage
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
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
            format: if config.json_output { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
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
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Start a correlated operation
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        {
            let mut context = self.context.write().await;
            context.current_correlation_id = Some(correlation_id.clone());
        }

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    /// End a correlated operation
    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.debug(&format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log()
            .await;

        let mut context = self.context.write().await;
        if context.current_correlation_id.as_deref() == Some(correlation_id) {
            context.current_correlation_id = None;
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
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        if entry.correlation_id.is_none() {
            entry.correlation_id = context.current_correlation_id.clone();
        }
        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        let output = self.format_entry(&entry);

        // stdout carries the gauge and reports; keep logs off it
        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
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
            let mut fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields_str.sort();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
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

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_cosmetic", error.is_cosmetic())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn render(self) -> String {
        self.logger.format_entry(&self.entry)
    }
}

/// Logger for sequencer and phase runner activity
pub struct SimulationLogger {
    logger: Logger,
}

impl SimulationLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("SIM".to_string(), config),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn log_run_reset(&self, run: u32) {
        self.logger.debug(&format!("Run {} reset, display values and samples cleared", run))
            .field("run", run)
            .log()
            .await;
    }

    pub async fn log_phase_started(&self, phase: Phase, duration: Duration, ceiling: f64) {
        self.logger.info(&format!("{} phase started", phase))
            .field("phase", phase)
            .field("duration_ms", duration.as_millis() as u64)
            .field("ceiling", ceiling)
            .log()
            .await;
    }

    pub async fn log_phase_completed(&self, phase: Phase, ticks: u32, elapsed: Duration) {
        self.logger.info(&format!("{} phase completed after {} ticks", phase, ticks))
            .field("phase", phase)
            .field("ticks", ticks)
            .field("elapsed_ms", elapsed.as_millis() as u64)
            .log()
            .await;
    }

    pub async fn log_outcome(&self, run: u32, outcome: &TestOutcome) {
        self.logger.info(&format!("Run {} complete", run))
            .field("run", run)
            .field("download", outcome.download)
            .field("upload", outcome.upload)
            .field("ping", outcome.ping)
            .log()
            .await;
    }
}

/// Logger for the geolocation lookup
pub struct GeoLogger {
    logger: Logger,
}

impl GeoLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("GEO".to_string(), config),
        }
    }

    pub async fn log_lookup(&self, url: &str, result: &Result<UserInfo>) {
        match result {
            Ok(info) => {
                self.logger.debug(&format!("Geolocation lookup via {} succeeded", url))
                    .field("url", url)
                    .field("isp", &info.isp)
                    .field("city", &info.city)
                    .field("country", &info.country)
                    .log()
                    .await;
            }
            Err(error) => {
                self.logger.warn(&format!("Geolocation lookup via {} failed: {}", url, error))
                    .field("url", url)
                    .error_info(error)
                    .log()
                    .await;
            }
        }
    }
}

/// Error event logger with enhanced context
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR".to_string(), config),
        }
    }

    /// Log an application error with full context
    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let level = if error.is_cosmetic() { LogLevel::Warn } else { LogLevel::Error };
        let mut builder = self.logger.log(level, &message).error_info(error);
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }
}

/// Global logger factory and management
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
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_simulation_logger(&self) -> SimulationLogger {
        let logger = SimulationLogger::new(&self.config);
        logger.logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_geo_logger(&self) -> GeoLogger {
        let logger = GeoLogger::new(&self.config);
        logger.logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        let logger = ErrorEventLogger::new(&self.config);
        logger.logger.set_session_id(self.session_id.clone()).await;
        logger
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
    use std::str::FromStr;

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
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_logger_with_config_levels() {
        let quiet = Logger::with_config("T".to_string(), &Config::default());
        assert_eq!(quiet.min_level, LogLevel::Warn);

        let verbose = Config { verbose: true, ..Config::default() };
        assert_eq!(Logger::with_config("T".to_string(), &verbose).min_level, LogLevel::Info);

        let debug = Config { debug: true, enable_color: false, ..Config::default() };
        let logger = Logger::with_config("T".to_string(), &debug);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert!(!logger.use_color);
        assert!(logger.include_location);
    }

    #[test]
    fn test_json_output_switches_log_format() {
        let config = Config { json_output: true, ..Config::default() };
        let logger = Logger::with_config("T".to_string(), &config);
        assert_eq!(logger.format, LogFormat::Json);
    }

    #[tokio::test]
    async fn test_session_id_management() {
        let logger = Logger::new("TEST".to_string());
        logger.set_session_id("test-session".to_string()).await;

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("test-session"));
    }

    #[tokio::test]
    async fn test_operation_correlation_cleared_on_end() {
        let logger = Logger::new("TEST".to_string());
        let correlation_id = logger.start_operation("geo_lookup").await;
        assert_eq!(
            logger.context.read().await.current_correlation_id.as_deref(),
            Some(correlation_id.as_str())
        );

        logger.end_operation(&correlation_id, "geo_lookup", true).await;
        assert!(logger.context.read().await.current_correlation_id.is_none());
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Error));
    }

    #[test]
    fn test_console_rendering_includes_fields() {
        let mut logger = Logger::new("SIM".to_string());
        logger.set_color(false);
        let line = logger
            .info("tick")
            .field("phase", Phase::Upload)
            .field("value", 42.5)
            .render();
        assert!(line.contains(" INFO [SIM] tick"));
        assert!(line.contains("phase=\"upload\""));
        assert!(line.contains("value=42.5"));
    }

    #[test]
    fn test_json_rendering_is_parseable() {
        let mut logger = Logger::new("GEO".to_string());
        logger.set_format(LogFormat::Json);

        let line = logger
            .warn("lookup failed")
            .error_info(&AppError::geolocation("timeout"))
            .render();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["logger"], "GEO");
        assert_eq!(parsed["fields"]["error_category"], "GEO");
        assert_eq!(parsed["fields"]["error_cosmetic"], true);
    }

    #[test]
    fn test_compact_rendering() {
        let mut logger = Logger::new("SIM".to_string());
        logger.set_format(LogFormat::Compact);
        let line = logger.debug("reset").render();
        assert!(line.ends_with(" D SIM: reset"));
    }

    #[tokio::test]
    async fn test_factory_shares_session_id() {
        let factory = LoggerFactory::new(Config::default());
        let logger = factory.create_logger("APP").await;
        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some(factory.session_id()));
    }

    #[tokio::test]
    async fn test_specialized_loggers_do_not_panic() {
        let config = Config { debug: true, enable_color: false, ..Config::default() };
        let sim = SimulationLogger::new(&config);
        sim.log_run_reset(1).await;
        sim.log_phase_started(Phase::Download, Duration::from_secs(8), 123.0).await;
        sim.log_phase_completed(Phase::Download, 53, Duration::from_millis(8100)).await;
        sim.log_outcome(1, &TestOutcome::new(123.0, 45.0, 12.0)).await;

        let geo = GeoLogger::new(&config);
        geo.log_lookup("https://geo.test", &Ok(UserInfo::unavailable())).await;
        geo.log_lookup("https://geo.test", &Err(AppError::geolocation("down"))).await;

        let errors = ErrorEventLogger::new(&config);
        errors.log_error(&AppError::share("no clipboard"), Some("sharing")).await;
    }
}
