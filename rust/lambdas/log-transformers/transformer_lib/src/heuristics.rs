//! ## Free-text log line heuristics
//!
//! Pure functions used to pull a severity level and an embedded timestamp out of
//! an unstructured log line.
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// # Severity level of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Warning,
    Error,
    Fatal,
}

/// Order in which levels are looked for. ERROR is checked before WARN so that a
/// line mentioning both is reported at the higher severity.
pub const LEVEL_PRIORITY: [LogLevel; 7] = [
    LogLevel::Error,
    LogLevel::Fatal,
    LogLevel::Warn,
    LogLevel::Warning,
    LogLevel::Info,
    LogLevel::Debug,
    LogLevel::Trace,
];

lazy_static! {
    /// `YYYY-MM-DD` followed by `T` or a space and `HH:MM:SS`.
    static ref TIMESTAMP_REGEX: Regex =
        Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}[T ][0-9]{2}:[0-9]{2}:[0-9]{2}")
            .expect("failed creating regex");
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

/// # Classifies the severity of a log line
///
/// Looks for `[LEVEL]` or `LEVEL:` in the upper-cased line, taking levels in
/// [`LEVEL_PRIORITY`] order. Lines without a marker are [`LogLevel::Info`].
pub fn classify_level(line: &str) -> LogLevel {
    let upper = line.to_uppercase();
    LEVEL_PRIORITY
        .into_iter()
        .find(|level| {
            let name = level.as_str();
            upper.contains(&format!("[{name}]")) || upper.contains(&format!("{name}:"))
        })
        .unwrap_or(LogLevel::Info)
}

/// # Extracts the first embedded date-time from a log line
///
/// The date/time separator is normalised to `T`. No timezone or fractional
/// seconds are captured.
pub fn extract_timestamp(line: &str) -> Option<String> {
    TIMESTAMP_REGEX
        .find(line)
        .map(|found| found.as_str().replacen(' ', "T", 1))
}
