/// Service configuration.
///
/// A single TOML file names the link tables, the scenario directory, and
/// the logging setup:
///
/// ```toml
/// [tables]
/// gui_links = "Config/GUI_Links3.table"
/// schematic_links = "Config/Schematic_DSS_link4.table"
///
/// [scenarios]
/// directory = "Scenarios"
///
/// [logging]
/// level = "info"
/// file = "calscen.log"
/// ```
///
/// The configuration path defaults to `./calscen.toml` and can be
/// overridden with the `CALSCEN_CONFIG` environment variable (loaded
/// through dotenv in `main`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::LogLevel;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "calscen.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_VAR: &str = "CALSCEN_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub tables: TablesConfig,
    pub scenarios: ScenariosConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TablesConfig {
    /// Tab-delimited link table for plain location codes.
    pub gui_links: PathBuf,
    /// Tab-delimited link table for schematic-view codes.
    pub schematic_links: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenariosConfig {
    /// Directory holding the scenario store files.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Minimum level: "debug", "info", "warn" or "error". Defaults to info.
    pub level: Option<String>,
    /// Optional log file appended to alongside console output.
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn min_level(&self) -> LogLevel {
        match self.level.as_deref() {
            Some("debug") => LogLevel::Debug,
            Some("warn") => LogLevel::Warning,
            Some("error") => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Errors raised while loading the configuration file. Configuration is the
/// one place where failures are fatal to the caller rather than degraded.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads the configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&text).map_err(ConfigError::Parse)
}

/// Resolves the configuration path: the `CALSCEN_CONFIG` environment
/// variable when set, the default path otherwise.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = std::env::temp_dir().join("calscen_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calscen.toml");
        std::fs::write(
            &path,
            r#"
[tables]
gui_links = "Config/GUI_Links3.table"
schematic_links = "Config/Schematic_DSS_link4.table"

[scenarios]
directory = "Scenarios"

[logging]
level = "debug"
file = "calscen.log"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.tables.gui_links, PathBuf::from("Config/GUI_Links3.table"));
        assert_eq!(config.scenarios.directory, PathBuf::from("Scenarios"));
        assert_eq!(config.logging.min_level(), LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("calscen.log"));
    }

    #[test]
    fn test_logging_section_is_optional() {
        let dir = std::env::temp_dir().join("calscen_test_config_min");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calscen.toml");
        std::fs::write(
            &path,
            r#"
[tables]
gui_links = "a.table"
schematic_links = "b.table"

[scenarios]
directory = "runs"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.logging.min_level(), LogLevel::Info);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/calscen.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = std::env::temp_dir().join("calscen_test_config_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calscen.toml");
        std::fs::write(&path, "not [valid").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
