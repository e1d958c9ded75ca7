use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::ConfigError;
use crate::session::SessionConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Source of the settings a session starts with. Settings are only ever read;
/// nothing is written back between runs.
pub trait ConfigStore {
    fn load(&self) -> Result<SessionConfig, ConfigLoadError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "numsort") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("numsort_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// A missing file means defaults; a broken one is an error.
    fn load(&self) -> Result<SessionConfig, ConfigLoadError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(SessionConfig::default());
            }
            Err(source) => {
                return Err(ConfigLoadError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let cfg = serde_json::from_slice::<SessionConfig>(&bytes).map_err(|source| {
            ConfigLoadError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        cfg.validate().map_err(|source| ConfigLoadError::Invalid {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), "loaded settings");
        Ok(cfg)
    }
}
