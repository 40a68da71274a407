//! Application configuration.
//!
//! Loaded from YAML; every field has a default so an empty file (or no file)
//! yields a usable in-memory setup.

use crate::store::StoreOptions;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up by [`AppConfig::load_or_default`].
pub const DEFAULT_CONFIG_PATH: &str = ".projectboard/config.yaml";

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => write!(f, "failed to read config `{}`: {err}", path.display()),
            Self::Parse(path, err) => {
                write!(f, "failed to parse config `{}`: {err}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Parse(_, err) => Some(err),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub store: StoreOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend serves the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-memory backend prefilled with the demo data set.
    #[default]
    Seed,
    /// SQLite database file.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Database file, used by the `sqlite` backend.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// How long a write waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl BackendConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".projectboard/projectboard.db")
}

fn default_busy_timeout_ms() -> u64 {
    crate::db::DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace|debug|info|warn|error; build-mode default when unset.
    #[serde(default)]
    pub level: Option<String>,

    /// Absolute log directory. File logging stays off when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_yaml(&content).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Loads `path` when it exists; `Ok(None)` when there is no such file.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(ConfigError::Io(_, err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Loads [`DEFAULT_CONFIG_PATH`] when present, else defaults, then applies
    /// `PROJECTBOARD_*` environment overrides.
    ///
    /// A file that exists but cannot be read or parsed is logged and ignored.
    pub fn load_or_default() -> Self {
        let mut config = match Self::load_optional(DEFAULT_CONFIG_PATH) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(
                    "event=config_load module=config status=error path={DEFAULT_CONFIG_PATH} fallback=defaults error={err}"
                );
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies `PROJECTBOARD_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("PROJECTBOARD_BACKEND") {
            match kind.trim().to_ascii_lowercase().as_str() {
                "seed" => self.backend.kind = BackendKind::Seed,
                "sqlite" => self.backend.kind = BackendKind::Sqlite,
                _ => {}
            }
        }

        if let Some(path) = lookup("PROJECTBOARD_DB_PATH") {
            self.backend.path = PathBuf::from(path);
        }

        if let Some(timeout) = lookup("PROJECTBOARD_BUSY_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.trim().parse() {
                self.backend.busy_timeout_ms = timeout;
            }
        }

        if let Some(level) = lookup("PROJECTBOARD_LOG_LEVEL") {
            self.logging.level = Some(level);
        }

        if let Some(dir) = lookup("PROJECTBOARD_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, BackendKind, ConfigError};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.backend.kind, BackendKind::Seed);
        assert!(config.store.provision_default_columns);
        assert!(config.store.select_first_project);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_yaml(
            "backend:\n  kind: sqlite\n  path: /tmp/board.db\nstore:\n  select_first_project: false\n",
        )
        .unwrap();
        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(config.backend.path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.backend.busy_timeout_ms, 5000);
        assert!(config.store.provision_default_columns);
        assert!(!config.store.select_first_project);
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PROJECTBOARD_BACKEND", "SQLite"),
            ("PROJECTBOARD_BUSY_TIMEOUT_MS", "250"),
            ("PROJECTBOARD_LOG_LEVEL", "debug"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(config.backend.busy_timeout_ms, 250);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.dir, None);
    }

    #[test]
    fn invalid_override_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            "PROJECTBOARD_BACKEND" => Some("postgres".to_string()),
            "PROJECTBOARD_BUSY_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn optional_load_separates_missing_from_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_optional(dir.path().join("absent.yaml"))
            .unwrap()
            .is_none());

        let malformed = dir.path().join("malformed.yaml");
        std::fs::write(&malformed, "store: [1, 2]\n").unwrap();
        assert!(matches!(
            AppConfig::load_optional(&malformed),
            Err(ConfigError::Parse(..))
        ));

        let valid = dir.path().join("valid.yaml");
        std::fs::write(&valid, "backend:\n  kind: sqlite\n").unwrap();
        let config = AppConfig::load_optional(&valid).unwrap().unwrap();
        assert_eq!(config.backend.kind, BackendKind::Sqlite);
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend: [not, a, map]").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
        assert!(err.to_string().contains("failed to parse config"));
    }
}
