use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::{Config, expand_tilde};

/// Error type for configuration handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config file already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// The pa config directory, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| expand_tilde("~/.config"))
        .join("pa")
}

pub fn config_path() -> PathBuf {
    config_dir().join("pa.toml")
}

/// Load the config, preferring an explicit override path.
///
/// A missing file at the default location means compiled-in defaults; a
/// missing file the user pointed at explicitly is an error.
pub fn load(override_path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    if !path.exists() && override_path.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

/// Write the default config to `path`, refusing to clobber an existing file
/// unless `force` is set.
pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
