use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, NaiveDate};
use tempfile::NamedTempFile;

use crate::cli::output;
use crate::model::todo::{Line, TodoLine, TodoState};
use crate::parse::{classify_line, render_line, render_todo};

/// Error type for daily note file operations
#[derive(Debug, thiserror::Error)]
pub enum DailyError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Line-anchored pattern for open items, handed to the external search tool.
/// The built-in walk recognizes exactly the same set of lines via
/// [`classify_line`].
pub const OPEN_MARKER_PATTERN: &str = r"^- \[ \] ";

pub fn daily_notes_dir(note_root: &Path) -> PathBuf {
    note_root.join("daily-notes")
}

/// Path of the daily file for a date: `<root>/daily-notes/<y>/<m>/<d>.md`
/// with unpadded numeric components.
pub fn daily_file_path(note_root: &Path, date: NaiveDate) -> PathBuf {
    daily_notes_dir(note_root)
        .join(date.year().to_string())
        .join(date.month().to_string())
        .join(format!("{}.md", date.day()))
}

/// The fixed header block every new daily or note file starts with.
pub fn header(date: NaiveDate) -> String {
    format!(
        "### Date :: {}/{}/{}\n### Tags :: \n",
        date.month(),
        date.day(),
        date.year()
    )
}

/// Locate today's daily file, creating it (and migrating any outstanding
/// items from earlier days) if this is the first TODO command of the day.
///
/// Once the file exists this is a no-op returning its path, so migration
/// runs at most once per day no matter how many commands are issued.
pub fn ensure_today_file(
    note_root: &Path,
    search_tool: Option<&str>,
    today: NaiveDate,
) -> Result<PathBuf, DailyError> {
    let path = daily_file_path(note_root, today);
    if path.exists() {
        return Ok(path);
    }

    let daily_root = daily_notes_dir(note_root);
    fs::create_dir_all(&daily_root)?;

    let mut migrated = Vec::new();
    for file in files_with_open_items(&daily_root, search_tool)? {
        if file == path {
            continue;
        }
        migrated.extend(migrate_file(&file)?);
    }

    if !migrated.is_empty() {
        output::notice("Moving existing TODOs to today:");
        for todo in &migrated {
            println!("{}", todo.content);
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut content = header(today);
    content.push('\n');
    for todo in &migrated {
        content.push_str(&render_todo(&todo.reopened()));
        content.push('\n');
    }

    atomic_write(&path, content.as_bytes()).map_err(|source| DailyError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Reclassify every open item in `path` as migrated, preserving content and
/// any remote id byte-for-byte. Returns the items that were moved, in file
/// order. A file with no open items is left untouched.
fn migrate_file(path: &Path) -> Result<Vec<TodoLine>, DailyError> {
    let mut lines = read_lines(path)?;
    let mut moved = Vec::new();

    for line in lines.iter_mut() {
        if let Some(todo) = line.as_todo_mut()
            && todo.state == TodoState::Open
        {
            moved.push(todo.clone());
            todo.state = TodoState::Migrated;
        }
    }

    if !moved.is_empty() {
        tracing::debug!(path = %path.display(), count = moved.len(), "migrating open items");
        write_lines(path, &lines)?;
    }

    Ok(moved)
}

/// Find every file under the daily notes tree containing at least one open
/// item. Uses the configured list-files-with-matches tool when one is set,
/// falling back to the built-in walk if it cannot be spawned. Results are
/// sorted by path so migration order is deterministic.
fn files_with_open_items(
    daily_root: &Path,
    search_tool: Option<&str>,
) -> Result<Vec<PathBuf>, DailyError> {
    let mut files = match search_tool {
        Some(tool) => match external_candidates(daily_root, tool) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(tool, error = %e, "search tool failed, falling back to walk");
                walk_candidates(daily_root)?
            }
        },
        None => walk_candidates(daily_root)?,
    };
    files.sort();
    Ok(files)
}

fn external_candidates(daily_root: &Path, tool: &str) -> io::Result<Vec<PathBuf>> {
    let out = Command::new(tool)
        .arg("-l")
        .arg(OPEN_MARKER_PATTERN)
        .current_dir(daily_root)
        .output()?;

    // rg/ag exit non-zero for "no matches"; an empty listing is fine either way
    Ok(String::from_utf8_lossy(&out.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| daily_root.join(l))
        .collect())
}

fn walk_candidates(dir: &Path) -> Result<Vec<PathBuf>, DailyError> {
    let mut out = Vec::new();
    walk_into(dir, &mut out)?;
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DailyError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_into(&path, out)?;
        } else if file_has_open_item(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn file_has_open_item(path: &Path) -> bool {
    let Ok(text) = fs::read_to_string(path) else {
        tracing::warn!(path = %path.display(), "skipping unreadable file");
        return false;
    };
    text.lines().any(|l| {
        classify_line(l)
            .as_todo()
            .is_some_and(|t| t.state == TodoState::Open)
    })
}

/// Append a fresh open item to the end of the file.
pub fn append_todo(path: &Path, text: &str) -> Result<(), DailyError> {
    let mut f = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| DailyError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    writeln!(f, "- [ ] {}", text).map_err(|source| DailyError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and classify every line of a daily file.
pub fn read_lines(path: &Path) -> Result<Vec<Line>, DailyError> {
    let text = fs::read_to_string(path).map_err(|source| DailyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(classify_line).collect())
}

/// Serialize the full line sequence back over the file.
pub fn write_lines(path: &Path, lines: &[Line]) -> Result<(), DailyError> {
    let mut content = String::new();
    for line in lines {
        content.push_str(&render_line(line));
        content.push('\n');
    }
    atomic_write(path, content.as_bytes()).map_err(|source| DailyError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write via a temp file in the same directory and persist over the target,
/// so a failed write never leaves a half-written daily file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
