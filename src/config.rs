//! Configuration for weft
//!
//! A single JSON file:
//!
//! ```json
//! {
//!   "schema_dir": "./entities",
//!   "version_field": "version",
//!   "log_level": "info",
//!   "test_mode": false
//! }
//! ```
//!
//! Only `schema_dir` is required. A relative `schema_dir` is resolved
//! against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::{EntityRegistry, SchemaResult, DEFAULT_VERSION_FIELD};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{0}': {1}")]
    Unreadable(String, String),

    #[error("Invalid config JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid config value for '{0}': {1}")]
    InvalidValue(&'static str, String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Unreadable(_, _) => "WEFT_CONFIG_UNREADABLE",
            ConfigError::InvalidJson(_) => "WEFT_CONFIG_INVALID_JSON",
            ConfigError::InvalidValue(_, _) => "WEFT_CONFIG_INVALID_VALUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of `*.json` entity declarations (required)
    pub schema_dir: PathBuf,

    /// Key the schema version is written under (default "version")
    #[serde(default = "default_version_field")]
    pub version_field: String,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Appends `_test` to every collection name (default false)
    #[serde(default)]
    pub test_mode: bool,
}

fn default_version_field() -> String {
    DEFAULT_VERSION_FIELD.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            version_field: default_version_field(),
            log_level: default_log_level(),
            test_mode: false,
        }
    }

    /// Loads and validates a config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(path.display().to_string(), e.to_string()))?;

        let mut config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;

        if config.schema_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.schema_dir = base.join(&config.schema_dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("schema_dir", "must not be empty".to_string()));
        }

        let field = self.version_field.as_str();
        if field.is_empty() || field.starts_with('$') || field.contains('.') || field == "_id" {
            return Err(ConfigError::InvalidValue(
                "version_field",
                format!("'{}' is not a usable top-level key", field),
            ));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|_| ConfigError::InvalidValue("log_level", self.log_level.clone()))
    }

    /// Sets the process-wide log threshold
    pub fn apply(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        let schema_dir = self.schema_dir.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("log_level", self.log_level.as_str()),
                ("schema_dir", schema_dir.as_str()),
                ("test_mode", if self.test_mode { "true" } else { "false" }),
            ],
        );
        Ok(())
    }

    /// Registry loaded from `schema_dir` with this config's version key
    /// and test mode
    pub fn load_registry(&self) -> SchemaResult<EntityRegistry> {
        let mut registry = EntityRegistry::with_options(self.version_field.clone(), self.test_mode);
        registry.load_dir(&self.schema_dir)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("weft.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_and_relative_schema_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"schema_dir": "entities"}"#);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_dir, dir.path().join("entities"));
        assert_eq!(config.version_field, "version");
        assert_eq!(config.log_level, "info");
        assert!(!config.test_mode);
    }

    #[test]
    fn test_missing_schema_dir_is_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"log_level": "info"}"#);
        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), "WEFT_CONFIG_INVALID_JSON");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"schema_dir": "x", "verbose": true}"#);
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::new("x");
        assert!(config.validate().is_ok());

        config.log_level = "loud".to_string();
        assert_eq!(config.validate().unwrap_err().code(), "WEFT_CONFIG_INVALID_VALUE");

        config.log_level = "warn".to_string();
        config.version_field = "$v".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "WEFT_CONFIG_UNREADABLE");
    }

    #[test]
    fn test_load_registry() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.json"), r#"{"name": "notes", "version": 1}"#).unwrap();
        let mut config = Config::new(dir.path());
        config.test_mode = true;

        let registry = config.load_registry().unwrap();
        assert_eq!(registry.get("notes").unwrap().collection(), "notes_test");
    }
}
