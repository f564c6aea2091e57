//! Configuration loading for Herald.
//!
//! Config lives at `~/.herald/config.toml`. A missing file means defaults;
//! a present file that cannot be read or parsed is an error the caller sees.

use std::path::{Path, PathBuf};

use herald_types::{InvalidTtl, Ttl};
use serde::Deserialize;
use thiserror::Error;

pub(crate) const fn default_ttl_ms() -> u64 {
    5000
}

#[derive(Debug, Default, Deserialize)]
pub struct HeraldConfig {
    /// Transient notification queue settings.
    pub notifications: Option<NotificationsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Lifetime of every notification, in milliseconds. Must be positive.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

impl NotificationsConfig {
    pub fn ttl(&self) -> Result<Ttl, ConfigError> {
        Ok(Ttl::from_millis(self.ttl_ms)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid [notifications] ttl_ms: {0}")]
    InvalidTtl(#[from] InvalidTtl),
}

impl ConfigError {
    /// Path of the offending file, when the error came from one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            ConfigError::InvalidTtl(_) => None,
        }
    }
}

impl HeraldConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Parse config text that did not come from a file.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validated notification lifetime, falling back to the default when the
    /// `[notifications]` table is absent.
    pub fn ttl(&self) -> Result<Ttl, ConfigError> {
        match &self.notifications {
            Some(notifications) => notifications.ttl(),
            None => Ok(Ttl::DEFAULT),
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".herald").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    #[test]
    fn empty_config_uses_default_ttl() {
        let config = HeraldConfig::parse("").unwrap();
        assert!(config.notifications.is_none());
        assert_eq!(config.ttl().unwrap(), Ttl::DEFAULT);
    }

    #[test]
    fn empty_section_uses_default_ttl() {
        let config = HeraldConfig::parse("[notifications]\n").unwrap();
        assert_eq!(config.ttl().unwrap().as_duration(), Duration::from_millis(5000));
    }

    #[test]
    fn explicit_ttl_is_honored() {
        let config = HeraldConfig::parse("[notifications]\nttl_ms = 1500\n").unwrap();
        assert_eq!(config.ttl().unwrap().as_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn zero_ttl_is_a_config_error() {
        let config = HeraldConfig::parse("[notifications]\nttl_ms = 0\n").unwrap();
        let err = config.ttl().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTtl(_)));
        assert!(err.path().is_none());
    }

    #[test]
    fn negative_ttl_fails_to_parse() {
        assert!(HeraldConfig::parse("[notifications]\nttl_ms = -5\n").is_err());
    }

    #[test]
    fn unknown_notification_key_is_rejected() {
        assert!(HeraldConfig::parse("[notifications]\nttl = 5\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notifications]\nttl_ms = 250").unwrap();

        let config = HeraldConfig::load_from(file.path()).unwrap();
        assert_eq!(config.ttl().unwrap().as_duration(), Duration::from_millis(250));
    }

    #[test]
    fn load_from_reports_parse_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notifications\nttl_ms = ").unwrap();

        let err = HeraldConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(file.path()));
    }

    #[test]
    fn load_from_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = HeraldConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn config_path_is_under_home() {
        if let Some(path) = config_path() {
            assert!(path.ends_with(".herald/config.toml"));
        }
    }
}
