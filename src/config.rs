// Session/config persistence. The session is a tiny YAML record holding the
// service base URL and the bearer token obtained at login.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base URL written on first run.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1/";

/// Everything the CLI remembers between invocations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory (neither XDG_CONFIG_HOME nor a home directory is set)")]
    NoConfigDir,
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {} is not valid", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write config file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config")]
    Serialize(#[from] serde_yaml::Error),
}

/// Load/save contract for the session. The controller only talks to this
/// trait so tests can swap the file for memory.
pub trait SessionStore {
    fn load(&self) -> Result<Session, ConfigError>;
    fn save(&self, session: &Session) -> Result<(), ConfigError>;
}

/// `$XDG_CONFIG_HOME/apos`, falling back to `~/.config/apos`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_path_from(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
}

fn config_path_from(xdg: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match xdg.filter(|dir| !dir.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir).join("apos")),
        None => home
            .map(|h| h.join(".config").join("apos"))
            .ok_or(ConfigError::NoConfigDir),
    }
}

/// Session store backed by a single YAML file, overwritten on every save.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, ConfigError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no config found, writing defaults");
                let session = Session::default();
                self.save(&session)?;
                return Ok(session);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, session: &Session) -> Result<(), ConfigError> {
        let data = serde_yaml::to_string(session)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, data).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}
