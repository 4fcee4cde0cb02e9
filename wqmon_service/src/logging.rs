/// Structured logging for the water quality monitoring service
///
/// Provides context-rich logging with component tags, optional station
/// identifiers, timestamps, and severity levels. Supports both console
/// output and file-based logging for unattended pipeline runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::StoreError;
use crate::normalize::NormalizeStats;

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

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Store,
    Normalize,
    Ingest,
    Report,
    Pipeline,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Store => write!(f, "STORE"),
            Component::Normalize => write!(f, "NORM"),
            Component::Ingest => write!(f, "INGEST"),
            Component::Report => write!(f, "REPORT"),
            Component::Pipeline => write!(f, "PIPE"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. a malformed submission the user can correct
    Expected,
    /// Unexpected failure - the store is down or misconfigured
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

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        // A poisoned lock only means another thread panicked mid-log; the
        // slot itself is still usable.
        let mut slot = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(logger);
    }

    fn format_entry(level: LogLevel, component: Component, station: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, station_part, message)
    }

    fn log(&self, level: LogLevel, component: Component, station: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, station, message);
        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, station_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, station_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, station: Option<&str>, message: &str) {
    let guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, component, station, message);
    }
}

/// Log a general informational message
pub fn info(component: Component, station: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, station, message);
}

/// Log a warning message
pub fn warn(component: Component, station: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, station, message);
}

/// Log an error message
pub fn error(component: Component, station: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, station, message);
}

/// Log a debug message
pub fn debug(component: Component, station: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, station, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a store failure.
///
/// An unreachable store takes the whole interaction down, so it is always
/// unexpected. A rejected write may be a bad document or a permissions
/// problem; without more context it stays unknown.
pub fn classify_store_failure(err: &StoreError) -> FailureType {
    match err {
        StoreError::Connection(_) => FailureType::Unexpected,
        StoreError::Write(msg) if msg.contains("nested value") => FailureType::Expected,
        StoreError::Write(_) => FailureType::Unknown,
    }
}

/// Log a store failure with automatic classification
pub fn log_store_failure(station: Option<&str>, operation: &str, err: &StoreError) {
    let failure_type = classify_store_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Store, station, &message),
        FailureType::Unexpected => error(Component::Store, station, &message),
        FailureType::Unknown => warn(Component::Store, station, &message),
    }
}

// ---------------------------------------------------------------------------
// Normalization Summary Logging
// ---------------------------------------------------------------------------

/// Log how many values the normalizer had to drop.
pub fn log_normalize_summary(stats: &NormalizeStats) {
    let dropped = stats.total_unparseable();
    let message = format!(
        "Normalized {} records: {} unparseable values dropped",
        stats.total, dropped
    );

    if dropped == 0 {
        info(Component::Normalize, None, &message);
    } else {
        warn(Component::Normalize, None, &message);
        for c in stats.coverage.iter().filter(|c| c.unparseable > 0) {
            debug(
                Component::Normalize,
                None,
                &format!("{}: {} unparseable", c.field, c.unparseable),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" INFO ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let unreachable = StoreError::Connection("connection refused".to_string());
        assert_eq!(classify_store_failure(&unreachable), FailureType::Unexpected);

        let nested = StoreError::Write("field 'PH' holds a nested value; documents must be flat".to_string());
        assert_eq!(classify_store_failure(&nested), FailureType::Expected);

        let rejected = StoreError::Write("permission denied for table water_quality".to_string());
        assert_eq!(classify_store_failure(&rejected), FailureType::Unknown);
    }

    #[test]
    fn test_messages_still_reach_log_file_after_lock_poisoned() {
        let path = std::env::temp_dir().join(format!("wqmon_logging_{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        init_logger(LogLevel::Debug, path.to_str(), false);

        let _ = std::thread::spawn(|| {
            let _guard = LOGGER.lock().unwrap_or_else(|e| e.into_inner());
            panic!("poison the logger");
        })
        .join();
        assert!(LOGGER.is_poisoned());

        info(Component::System, None, "logged after poisoning");
        let contents = std::fs::read_to_string(&path).expect("log file was written");
        assert!(contents.contains("logged after poisoning"), "got '{}'", contents);

        LOGGER.clear_poison();
        *LOGGER.lock().unwrap_or_else(|e| e.into_inner()) = None;
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_entry_format_includes_component_and_station() {
        let entry = Logger::format_entry(LogLevel::Warning, Component::Ingest, Some("1312"), "slow insert");
        assert!(entry.ends_with("WARN INGEST [1312]: slow insert"), "got '{}'", entry);
    }
}
