use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger structure
#[derive(Debug)]
struct DrillbotLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl DrillbotLogger {
    // Debug and trace records only pass when their target is one of the selected topics
    fn topic_enabled(&self, metadata: &Metadata) -> bool {
        match &self.debug_filters {
            Some(filters)
                if metadata.level() == log::Level::Debug
                    || metadata.level() == log::Level::Trace =>
            {
                filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()))
            }
            _ => true,
        }
    }
}

/// Pulls the number out of a "Tick N" marker, if the message carries one.
fn extract_tick(message: &str) -> Option<u64> {
    let start = message.find("Tick ")? + 5;
    let digits: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl log::Log for DrillbotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && self.topic_enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let message = record.args().to_string();
        let context = match extract_tick(&message) {
            Some(tick) => format!("[T{:03}] ", tick),
            None => String::new(),
        };

        let output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {message}",
            level = record.level(),
            target = record.target(),
        );

        // Diagnostics go to stderr; stdout carries the simulation log
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "{}", output);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: OnceLock<DrillbotLogger> = OnceLock::new();

/// Installs the diagnostic logger; `debug_filter` is a comma separated topic list.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| DrillbotLogger {
        level,
        debug_filters,
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Parses a `--log-level` value, falling back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

// Helper macros for specific debug topics
#[macro_export]
macro_rules! debug_engine {
    ($tick:expr, $($arg:tt)*) => {
        log::debug!(target: "engine", "Tick {} {}", $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_collision {
    ($tick:expr, $($arg:tt)*) => {
        log::debug!(target: "collision", "Tick {} {}", $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_timer {
    ($($arg:tt)*) => {
        log::debug!(target: "timer", "{}", format_args!($($arg)*))
    };
}
