//! Run configuration.
//!
//! Values come from an optional TOML file, overridden field by field by the
//! command line. [`ConfigFile::into_config`] fills in defaults and validates.

use crate::logging;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_PATH: &str = "dmconvert.db";
const DEFAULT_LOG_DIR: &str = "log";

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml(toml::de::Error),
    MissingInput,
    InvalidLogLevel(String),
    /// The current directory is needed to resolve a relative path.
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Toml(err) => write!(f, "invalid config: {err}"),
            Self::MissingInput => write!(f, "no input file given"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Toml(err) => Some(err),
            Self::CurrentDir(err) => Some(err),
            Self::MissingInput | Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

/// Partial configuration, as read from TOML or built from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub link_projects: Option<bool>,
    pub export_path: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            input: overrides.input.or(self.input),
            db_path: overrides.db_path.or(self.db_path),
            log_dir: overrides.log_dir.or(self.log_dir),
            log_level: overrides.log_level.or(self.log_level),
            link_projects: overrides.link_projects.or(self.link_projects),
            export_path: overrides.export_path.or(self.export_path),
        }
    }

    /// Applies defaults and validates the result.
    pub fn into_config(self) -> Result<ConvertConfig, ConfigError> {
        let input = self.input.ok_or(ConfigError::MissingInput)?;
        let log_level = match self.log_level {
            Some(level) => logging::normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => logging::default_log_level(),
        };
        let log_dir = absolute(self.log_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)))?;

        Ok(ConvertConfig {
            input,
            db_path: self
                .db_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            log_dir,
            log_level: log_level.to_string(),
            link_projects: self.link_projects.unwrap_or(true),
            export_path: self.export_path,
        })
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(cwd.join(path))
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Turtle export to convert.
    pub input: PathBuf,
    pub db_path: PathBuf,
    /// Always absolute.
    pub log_dir: PathBuf,
    pub log_level: String,
    pub link_projects: bool,
    pub export_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_fields() {
        let config = ConfigFile {
            input: Some("data.ttl".into()),
            ..ConfigFile::default()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("dmconvert.db"));
        assert!(config.log_dir.is_absolute());
        assert!(config.log_dir.ends_with("log"));
        assert_eq!(config.log_level, logging::default_log_level());
        assert!(config.link_projects);
        assert_eq!(config.export_path, None);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = ConfigFile::from_toml_str(
            r#"
            input = "from-file.ttl"
            db_path = "file.db"
            link_projects = true
            log_level = "warn"
            "#,
        )
        .unwrap();
        let overrides = ConfigFile {
            input: Some("from-cli.ttl".into()),
            link_projects: Some(false),
            ..ConfigFile::default()
        };

        let config = file.merge(overrides).into_config().unwrap();
        assert_eq!(config.input, PathBuf::from("from-cli.ttl"));
        assert_eq!(config.db_path, PathBuf::from("file.db"));
        assert_eq!(config.log_level, "warn");
        assert!(!config.link_projects);
    }

    #[test]
    fn missing_input_and_bad_values_are_rejected() {
        assert!(matches!(
            ConfigFile::default().into_config(),
            Err(ConfigError::MissingInput)
        ));
        assert!(matches!(
            ConfigFile::from_toml_str("unknown_key = 1"),
            Err(ConfigError::Toml(_))
        ));
        let bad_level = ConfigFile {
            input: Some("x.ttl".into()),
            log_level: Some("shout".into()),
            ..ConfigFile::default()
        };
        assert!(matches!(
            bad_level.into_config(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn load_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            ConfigFile::load(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
