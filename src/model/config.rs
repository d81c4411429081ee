use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from pa.toml. Loaded once per invocation and passed as an
/// argument into every operation that needs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub note: NoteConfig,
    pub todoist: TodoistConfig,
    pub toggl: TogglConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Editor launched by `todo open` and `note <title>`
    pub editor: String,
    /// External list-files-with-matches tool (e.g. "rg"). Empty string
    /// means the built-in directory walk is used instead.
    pub search_tool: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            editor: "vim".to_string(),
            search_tool: String::new(),
        }
    }
}

impl GeneralConfig {
    pub fn search_tool(&self) -> Option<&str> {
        let tool = self.search_tool.trim();
        if tool.is_empty() { None } else { Some(tool) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Root directory holding notes/ and daily-notes/. A leading `~` is
    /// expanded against $HOME.
    pub note_root: String,
}

impl Default for NoteConfig {
    fn default() -> Self {
        NoteConfig {
            note_root: "~/notes".to_string(),
        }
    }
}

impl NoteConfig {
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.note_root)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoistConfig {
    pub enabled: bool,
    pub api_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TogglConfig {
    pub enabled: bool,
    pub api_token: String,
}

/// Expand a leading `~` against $HOME. Paths without one pass through.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        return home_dir().join(rest);
    }
    if path == "~" {
        return home_dir();
    }
    PathBuf::from(path)
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}
