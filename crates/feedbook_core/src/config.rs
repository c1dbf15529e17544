//! User configuration for front ends.
//!
//! # Responsibility
//! - Read and write the JSON config file.
//! - Resolve every unset field to its default.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - The effective fetch timeout always lies in
//!   `MIN_FETCH_TIMEOUT_SECS..=MAX_FETCH_TIMEOUT_SECS`.
//!
//! # See also
//! - `crate::network::HttpArticleFetcher` consumes the fetch settings.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOME_ENV: &str = "FEEDBOOK_HOME";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DATABASE_FILE_NAME: &str = "feedbook.sqlite3";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const MIN_FETCH_TIMEOUT_SECS: u64 = 1;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 120;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "config file `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "invalid config file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

/// On-disk settings. Unset fields resolve through the accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding both books.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,

    /// Initial offline flag.
    #[serde(default)]
    pub offline: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Config {
    /// Reads `path`, or returns defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes pretty JSON to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_error)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path
            .clone()
            .unwrap_or_else(|| data_dir().join(DATABASE_FILE_NAME))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn fetch_timeout(&self) -> Duration {
        let secs = self
            .fetch_timeout_secs
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("feedbook/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Data directory: `$FEEDBOOK_HOME`, else `$HOME/.feedbook`, else a
/// directory under the system temp dir.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var_os(HOME_ENV), std::env::var_os("HOME"))
}

/// Default config file location inside [`data_dir`].
pub fn default_config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE_NAME)
}

fn resolve_data_dir(feedbook_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let non_empty = |value: OsString| (!value.is_empty()).then(|| PathBuf::from(value));
    feedbook_home
        .and_then(non_empty)
        .or_else(|| home.and_then(non_empty).map(|home| home.join(".feedbook")))
        .unwrap_or_else(|| std::env::temp_dir().join("feedbook"))
}

#[cfg(test)]
mod tests {
    use super::{resolve_data_dir, Config, ConfigError, MAX_FETCH_TIMEOUT_SECS};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert!(!config.offline);
    }

    #[test]
    fn saved_config_round_trips_and_omits_unset_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            offline: true,
            fetch_timeout_secs: Some(30),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("user_agent"));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn timeout_is_clamped() {
        let parsed: Config = serde_json::from_str(r#"{"fetch_timeout_secs": 0}"#).unwrap();
        assert_eq!(parsed.fetch_timeout(), Duration::from_secs(1));
        let parsed: Config = serde_json::from_str(r#"{"fetch_timeout_secs": 9999}"#).unwrap();
        assert_eq!(
            parsed.fetch_timeout(),
            Duration::from_secs(MAX_FETCH_TIMEOUT_SECS)
        );
    }

    #[test]
    fn data_dir_prefers_override_then_home() {
        assert_eq!(
            resolve_data_dir(Some("/srv/fb".into()), Some("/home/u".into())),
            PathBuf::from("/srv/fb")
        );
        assert_eq!(
            resolve_data_dir(Some("".into()), Some("/home/u".into())),
            PathBuf::from("/home/u/.feedbook")
        );
        assert_eq!(
            resolve_data_dir(None, None),
            std::env::temp_dir().join("feedbook")
        );
    }
}
