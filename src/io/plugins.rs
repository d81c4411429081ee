use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::cli::output;
use crate::io::config_io;

/// A plugin descriptor file: `<config_dir>/pa/plugins/<name>.toml`.
/// The file stem is the sub-command name.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDescriptor {
    /// One-line summary shown by `pa commands`
    #[serde(default)]
    pub summary: String,
    /// Program and fixed arguments; CLI arguments are appended on dispatch
    #[serde(default)]
    pub exec: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: String,
    pub descriptor: PluginDescriptor,
}

/// Error type for plugin discovery and dispatch
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
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
    #[error("invalid plugin '{name}': {reason}")]
    Invalid { name: String, reason: String },
    #[error("'{0}' is not a pa command. See 'pa --help'")]
    UnknownCommand(String),
    #[error("could not run plugin '{name}': {source}")]
    Spawn {
        name: String,
        source: io::Error,
    },
}

pub fn plugins_dir() -> PathBuf {
    config_io::config_dir().join("plugins")
}

/// Load and validate a single descriptor file.
pub fn load_descriptor(path: &Path) -> Result<Plugin, PluginError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let text = fs::read_to_string(path).map_err(|source| PluginError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let descriptor: PluginDescriptor =
        toml::from_str(&text).map_err(|source| PluginError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if descriptor.summary.trim().is_empty() {
        return Err(PluginError::Invalid {
            name,
            reason: "missing summary".to_string(),
        });
    }
    if descriptor.exec.is_empty() {
        return Err(PluginError::Invalid {
            name,
            reason: "exec must name a program".to_string(),
        });
    }

    Ok(Plugin { name, descriptor })
}

/// Discover every valid plugin under `dir`, sorted by name. Descriptors that
/// fail validation are reported and skipped rather than trusted.
pub fn discover(dir: &Path) -> Vec<Plugin> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("toml"))
        .collect();
    paths.sort();

    let mut plugins = Vec::new();
    for path in paths {
        match load_descriptor(&path) {
            Ok(plugin) => plugins.push(plugin),
            Err(e) => output::notice(&format!("skipping plugin: {}", e)),
        }
    }
    plugins
}

/// Resolve a sub-command name against the plugin directory.
pub fn find(dir: &Path, name: &str) -> Result<Plugin, PluginError> {
    let path = dir.join(format!("{}.toml", name));
    if !path.is_file() {
        return Err(PluginError::UnknownCommand(name.to_string()));
    }
    load_descriptor(&path)
}

/// Run a plugin with extra CLI arguments appended, returning its exit code.
pub fn run(plugin: &Plugin, args: &[String]) -> Result<i32, PluginError> {
    let Some((program, fixed_args)) = plugin.descriptor.exec.split_first() else {
        return Err(PluginError::Invalid {
            name: plugin.name.clone(),
            reason: "exec must name a program".to_string(),
        });
    };

    tracing::debug!(plugin = %plugin.name, program, "dispatching to plugin");
    let status = Command::new(program)
        .args(fixed_args)
        .args(args)
        .status()
        .map_err(|source| PluginError::Spawn {
            name: plugin.name.clone(),
            source,
        })?;

    Ok(status.code().unwrap_or(1))
}
