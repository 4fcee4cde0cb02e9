/// Configuration for the water quality service.
///
/// Settings come from a TOML file (`wqmon.toml` by default). Every key is
/// optional and a missing file means "all defaults". The connection target
/// is never read from this file: it comes from `DATABASE_URL`, loaded via
/// `.env` when present, so credentials stay out of source control.
///
/// ```toml
/// [store]
/// collection = "water_quality"
///
/// [logging]
/// level = "info"
/// file = "wqmon.log"
/// timestamps = false
///
/// [report]
/// trend_fields = ["PH", "D.O. (mg/l)", "B.O.D. (mg/l)", "Temp"]
/// ```

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::model::{FIELD_BOD, FIELD_DISSOLVED_OXYGEN, FIELD_PH, FIELD_TEMPERATURE, Field};
use crate::store::DEFAULT_COLLECTION;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io(String),
    /// The file is not valid TOML or has the wrong shape.
    Parse(String),
    /// A value parsed but is not acceptable.
    Invalid(String),
    /// No connection target was given.
    MissingDatabaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Cannot read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Cannot parse config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL is not set (use .env, the environment, or --database-url)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreSettings,
    pub logging: LoggingSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    pub collection: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Wire names of the fields plotted in the yearly trend.
    pub trend_fields: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            trend_fields: [FIELD_PH, FIELD_DISSOLVED_OXYGEN, FIELD_BOD, FIELD_TEMPERATURE]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse().map_err(ConfigError::Invalid)
    }

    /// Resolves `report.trend_fields` to numeric fields.
    pub fn trend_fields(&self) -> Result<Vec<Field>, ConfigError> {
        self.report
            .trend_fields
            .iter()
            .map(|name| match Field::from_wire_name(name) {
                Some(field) if field.is_numeric() => Ok(field),
                Some(_) => Err(ConfigError::Invalid(format!(
                    "trend field '{}' is not numeric",
                    name
                ))),
                None => Err(ConfigError::Invalid(format!("unknown trend field '{}'", name))),
            })
            .collect()
    }
}

/// Picks the connection target: an explicit value wins, otherwise
/// `DATABASE_URL` from the environment (after loading `.env`).
pub fn database_url(explicit: Option<&str>) -> Result<String, ConfigError> {
    if let Some(url) = explicit.filter(|u| !u.trim().is_empty()) {
        return Ok(url.to_string());
    }
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .ok_or(ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = Config::from_toml_str("").expect("empty config is valid");
        assert_eq!(config.store.collection, "water_quality");
        assert_eq!(config.log_level().expect("default level parses"), LogLevel::Info);
        assert!(config.logging.file.is_none());
        assert_eq!(
            config.trend_fields().expect("default trend fields resolve"),
            vec![Field::Ph, Field::DissolvedOxygen, Field::Bod, Field::Temperature]
        );
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            [store]
            collection = "wq_staging"

            [logging]
            level = "debug"
            timestamps = true
            "#,
        )
        .expect("valid config");
        assert_eq!(config.store.collection, "wq_staging");
        assert_eq!(config.log_level().expect("level parses"), LogLevel::Debug);
        assert!(config.logging.timestamps);
        assert_eq!(config.report.trend_fields.len(), 4);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Config::from_toml_str("[store]\ncolection = \"typo\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_trend_fields_must_be_numeric_wire_names() {
        let config = Config::from_toml_str("[report]\ntrend_fields = [\"STATE\"]\n").expect("valid toml");
        assert!(matches!(config.trend_fields(), Err(ConfigError::Invalid(_))));

        let config = Config::from_toml_str("[report]\ntrend_fields = [\"pH\"]\n").expect("valid toml");
        assert!(matches!(config.trend_fields(), Err(ConfigError::Invalid(_))), "wire names are case sensitive");
    }

    #[test]
    fn test_bad_log_level_is_invalid() {
        let config = Config::from_toml_str("[logging]\nlevel = \"loud\"\n").expect("valid toml");
        assert!(matches!(config.log_level(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/wqmon.toml")).expect("missing file is not an error");
        assert_eq!(config.store.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let url = database_url(Some("postgres://wq@localhost/wq")).expect("explicit url");
        assert_eq!(url, "postgres://wq@localhost/wq");
    }
}
