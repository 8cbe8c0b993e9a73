use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::RwLock;
use std::time::{Duration, Instant};

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_level_filter();
    CONSOLE_LOGGER.update_config(config);

    log::set_logger(&*CONSOLE_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        self.to_level().to_level_filter()
    }

    /// Parses `RUST_LOG`-style names, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

/// One rendered log line, also the shape of JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub target: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            timestamp: Utc::now(),
            level: record.level().into(),
            message: record.args().to_string(),
            target: record.target().to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_target: bool,
    pub show_file_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub custom_prefix: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_target: true,
            show_file_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            custom_prefix: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_prefix = Some(prefix.into());
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct ConsoleLogger {
    config: RwLock<LoggerConfig>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(LoggerConfig::default()),
        }
    }

    pub fn update_config(&self, config: LoggerConfig) {
        if let Ok(mut current) = self.config.write() {
            *current = config;
        }
    }

    pub fn format(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(entry).unwrap_or_default();
        }

        let mut output = String::new();

        if let Some(prefix) = &config.custom_prefix {
            let prefix = if config.show_colors {
                prefix.bright_white().bold().to_string()
            } else {
                prefix.clone()
            };
            output.push_str(&format!("[{}] ", prefix));
        }

        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let level = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };

        if config.show_colors {
            output.push_str(&format!(
                "{} [{}] ",
                timestamp.bright_black(),
                level.color(entry.level.color()).bold()
            ));
        } else {
            output.push_str(&format!("{} [{}] ", timestamp, level));
        }

        if config.show_target && !entry.target.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}: ", entry.target.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", entry.target));
            }
        }

        output.push_str(&entry.message);

        if config.show_file_location {
            if let (Some(file), Some(line)) = (&entry.file, entry.line) {
                let location = format!("({}:{})", file, line);
                if config.show_colors {
                    output.push_str(&format!(" {}", location.bright_black()));
                } else {
                    output.push_str(&format!(" {}", location));
                }
            }
        }

        output
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.read() {
            Ok(config) => metadata.level() <= config.min_level.to_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(config) = self.config.read() {
            let entry = LogEntry::from_record(record);
            println!("{}", self.format(&entry, &config));
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Logs how long a named operation took when stopped or dropped.
pub struct Stopwatch {
    start: Instant,
    name: String,
    stopped: bool,
}

impl Stopwatch {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
            stopped: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(mut self) -> Duration {
        self.stopped = true;
        self.report()
    }

    fn report(&self) -> Duration {
        let elapsed = self.elapsed();
        log::info!("⏱️  {} completed in {}ms", self.name, elapsed.as_millis());
        elapsed
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        if !self.stopped {
            self.report();
        }
    }
}

pub fn log_startup_info(app_name: &str, version: &str, host: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Listening on http://{}:{}", host, port);
}

pub fn log_config_info(config: &crate::config::Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Upstream: {}", config.stability.base_url());
    log::info!(
        "   Server-side API key: {}",
        if config.stability.api_key.is_some() { "✅" } else { "❌" }
    );
    match &config.storage.credentials_path {
        Some(path) => log::info!("   Credentials file: {}", path.display()),
        None => log::info!("   Credentials file: ❌"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            target: "sdgen::server".to_string(),
            file: Some("src/server/mod.rs".to_string()),
            line: Some(12),
        }
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Error.emoji(), "❌");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn test_plain_format() {
        let logger = ConsoleLogger::new();
        let config = LoggerConfig::new()
            .with_colors(false)
            .with_prefix("proxy");
        let line = logger.format(&entry(LogLevel::Warn, "upstream slow"), &config);

        assert!(line.starts_with("[proxy] "));
        assert!(line.contains("[⚠️ WARN]"));
        assert!(line.ends_with("sdgen::server: upstream slow"));
    }

    #[test]
    fn test_json_format() {
        let logger = ConsoleLogger::new();
        let line = logger.format(&entry(LogLevel::Error, "boom"), &LoggerConfig::production());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "Error");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["line"], 12);
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::development();
        assert!(init_with_config(config).is_ok());
    }
}
