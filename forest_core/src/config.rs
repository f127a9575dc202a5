//! Shared plumbing for the JSON configuration files.
//!
//! Each configuration ships a builtin default compiled in with `include_str!`
//! and can be overridden at runtime through an environment variable naming a
//! file. A broken override is logged and the builtin is used instead.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use forest_schema::ParameterError;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::zones::ZoneError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid parameter bundle: {0}")]
    Parameters(#[from] ParameterError),
    #[error("invalid zone config: {0}")]
    Zones(#[from] ZoneError),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    path: Option<PathBuf>,
}

impl ConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.path.is_none()
    }
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Loads from the file named by `var` when set, falling back to `builtin`.
pub fn load_with_override<T>(
    var: &str,
    name: &'static str,
    from_file: impl Fn(&Path) -> Result<T, ConfigError>,
    builtin: impl FnOnce() -> T,
) -> (T, ConfigMetadata) {
    if let Some(path) = env::var_os(var).map(PathBuf::from) {
        match from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "forest::config",
                    config = name,
                    path = %path.display(),
                    "config.loaded=file"
                );
                return (config, ConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "forest::config",
                    config = name,
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "forest::config", config = name, "config.loaded=builtin");
    (builtin(), ConfigMetadata::default())
}
