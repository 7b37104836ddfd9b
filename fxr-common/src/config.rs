//! Configuration loading and root folder resolution
//!
//! Root folder resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`FXR_ROOT_FOLDER`, then `FXR_ROOT`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup; it is logged and
//! the built-in defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Database file name inside the root folder
pub const DEFAULT_DATABASE_FILE: &str = "film_recipes.db";

/// Browser-like User-Agent; the blog rejects non-browser agents with 403
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Sensor generation → recipe index page, in scrape order
pub const DEFAULT_SENSOR_INDEXES: [(&str, &str); 2] = [
    ("X-Trans V", "https://fujixweekly.com/fujifilm-x-trans-v-recipes/"),
    ("X-Trans IV", "https://fujixweekly.com/fujifilm-x-trans-iv-recipes/"),
];

const ENV_ROOT_FOLDER: &str = "FXR_ROOT_FOLDER";
const ENV_ROOT: &str = "FXR_ROOT";

/// Built-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("fxr"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fxr"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("fxr"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fxr"))
        } else {
            // ~/.local/share/fxr
            dirs::data_local_dir()
                .map(|d| d.join("fxr"))
                .unwrap_or_else(|| PathBuf::from("./fxr_data"))
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; absent values fall back to built-in defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Database file name (relative to the root folder) or absolute path
    #[serde(default)]
    pub database_file: Option<PathBuf>,

    /// Minimum delay between two HTTP requests
    #[serde(default)]
    pub request_delay_ms: Option<u64>,

    /// HTTP request timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// User-Agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// `[[sensors]]` entries, scraped in the order written
    #[serde(default)]
    pub sensors: Vec<SensorIndex>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One sensor generation and its recipe index page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensorIndex {
    pub name: String,
    pub index_url: String,
}

impl SensorIndex {
    pub fn new(name: impl Into<String>, index_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index_url: index_url.into(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from an explicit file path
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from the platform config location, defaults when absent or broken
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            debug!("No config file found, using built-in defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Delay between requests (default 1000 ms)
    pub fn request_delay_ms(&self) -> u64 {
        self.request_delay_ms.unwrap_or(1000)
    }

    /// Request timeout (default 30 s)
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Configured sensor indexes, or the built-in pair when none configured
    ///
    /// Order matters: an article linked from two index pages keeps the
    /// sensor of the last one scraped.
    pub fn sensor_indexes(&self) -> Vec<SensorIndex> {
        if !self.sensors.is_empty() {
            return self.sensors.clone();
        }
        DEFAULT_SENSOR_INDEXES
            .iter()
            .map(|(name, url)| SensorIndex::new(*name, *url))
            .collect()
    }
}

/// Platform config file location (`<config dir>/fxr/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fxr").join("config.toml"))
}

/// Resolves the root folder from CLI, environment, TOML and defaults
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Value from the TOML config (priority 3)
    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("{}: root folder from command line", self.module_name);
            return path.clone();
        }

        for var in [ENV_ROOT_FOLDER, ENV_ROOT] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    debug!("{}: root folder from {}", self.module_name, var);
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = &self.toml_root {
            debug!("{}: root folder from config file", self.module_name);
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder and locates the database inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
    database_file: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self {
            root_folder,
            database_file: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }

    /// Use a database file other than `film_recipes.db`
    pub fn with_database_file(mut self, file: Option<PathBuf>) -> Self {
        if let Some(file) = file {
            self.database_file = file;
        }
        self
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder).map_err(|e| {
            Error::Config(format!(
                "Cannot create root folder {}: {}",
                self.root_folder.display(),
                e
            ))
        })
    }

    /// Database path; an absolute database file ignores the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(&self.database_file)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.request_delay_ms(), 1000);
        assert_eq!(config.request_timeout_secs(), 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.user_agent().starts_with("Mozilla/5.0"));

        let names: Vec<String> = config
            .sensor_indexes()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["X-Trans V", "X-Trans IV"]);
    }

    #[test]
    fn test_sensor_list_replaces_defaults_in_order() {
        let config = TomlConfig::from_toml_str(
            r#"
            request_delay_ms = 250

            [[sensors]]
            name = "X-Trans IV"
            index_url = "https://fujixweekly.com/fujifilm-x-trans-iv-recipes/"

            [[sensors]]
            name = "X-Trans III"
            index_url = "https://fujixweekly.com/fujifilm-x-trans-iii-recipes/"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.request_delay_ms(), 250);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.sensor_indexes(),
            vec![
                SensorIndex::new(
                    "X-Trans IV",
                    "https://fujixweekly.com/fujifilm-x-trans-iv-recipes/"
                ),
                SensorIndex::new(
                    "X-Trans III",
                    "https://fujixweekly.com/fujifilm-x-trans-iii-recipes/"
                ),
            ]
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("request_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_absolute_database_file_overrides_root() {
        let initializer = RootFolderInitializer::new(PathBuf::from("/tmp/fxr-root"))
            .with_database_file(Some(PathBuf::from("/var/tmp/other.db")));
        assert_eq!(initializer.database_path(), PathBuf::from("/var/tmp/other.db"));
    }
}
