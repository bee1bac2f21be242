/// Structured logging for the dashboard client.
///
/// Provides context-rich logging with a source tag and optional site
/// identifier on every line. Events go through `tracing`; `init_logger`
/// installs a `tracing-subscriber` fmt layer on stderr and, optionally, an
/// append-only file layer for long-running sessions.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt as fmt_layer;
use tracing_subscriber::prelude::*;

use crate::model::FetchFailure;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<LogLevel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Log Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Data fetcher (HTTP API calls)
    Http,
    /// Push channel listener
    Push,
    /// View updaters
    View,
    /// Page controllers and the dispatch loop
    Page,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Http => write!(f, "HTTP"),
            Source::Push => write!(f, "PUSH"),
            Source::View => write!(f, "VIEW"),
            Source::Page => write!(f, "PAGE"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. the backend is restarting and refuses connections
    Expected,
    /// Unexpected failure - server errors or payloads we cannot decode
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Initialize the global logger.
///
/// Safe to call more than once: later calls are ignored, which keeps test
/// binaries that initialise per test from panicking.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let timed_console = console_timestamps.then(|| {
        fmt_layer::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let plain_console = (!console_timestamps).then(|| {
        fmt_layer::layer()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt_layer::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path, e);
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(min_level.filter())
        .with(timed_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: Source, site_id: Option<u32>, message: &str) {
    match site_id {
        Some(site) => tracing::info!(source = %source, site, "{}", message),
        None => tracing::info!(source = %source, "{}", message),
    }
}

/// Log a warning message
pub fn warn(source: Source, site_id: Option<u32>, message: &str) {
    match site_id {
        Some(site) => tracing::warn!(source = %source, site, "{}", message),
        None => tracing::warn!(source = %source, "{}", message),
    }
}

/// Log an error message
pub fn error(source: Source, site_id: Option<u32>, message: &str) {
    match site_id {
        Some(site) => tracing::error!(source = %source, site, "{}", message),
        None => tracing::error!(source = %source, "{}", message),
    }
}

/// Log a debug message
pub fn debug(source: Source, site_id: Option<u32>, message: &str) {
    match site_id {
        Some(site) => tracing::debug!(source = %source, site, "{}", message),
        None => tracing::debug!(source = %source, "{}", message),
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a fetch failure.
///
/// A refused or reset connection is what a restarting backend looks like,
/// so it is expected. 5xx responses and undecodable bodies point at a
/// server fault or an API change.
pub fn classify_fetch_failure(failure: &FetchFailure) -> FailureType {
    match failure {
        FetchFailure::Transport(msg)
            if msg.contains("refused") || msg.contains("reset") || msg.contains("closed") =>
        {
            FailureType::Expected
        }
        FetchFailure::Transport(_) => FailureType::Unknown,
        FetchFailure::Http(status) if *status >= 500 => FailureType::Unexpected,
        FetchFailure::Http(_) => FailureType::Unknown,
        FetchFailure::Decode(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification
pub fn log_fetch_failure(site_id: Option<u32>, operation: &str, failure: &FetchFailure) {
    let failure_type = classify_fetch_failure(failure);

    let message = format!("{} failed [{}]: {}", operation, failure_type, failure);

    match failure_type {
        FailureType::Expected => warn(Source::Http, site_id, &message),
        FailureType::Unexpected => error(Source::Http, site_id, &message),
        FailureType::Unknown => warn(Source::Http, site_id, &message),
    }
}

/// Log a summary of a batch of per-site fetches
pub fn log_batch_summary(operation: &str, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "{} complete: {}/{} successful, {} failed",
        operation, successful, total, failed
    );

    if failed == 0 {
        info(Source::Page, None, &message);
    } else if successful == 0 {
        error(Source::Page, None, &message);
    } else {
        warn(Source::Page, None, &message);
    }
}
