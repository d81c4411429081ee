use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDate;
use regex::Regex;

use crate::cli::output;
use crate::io::daily;
use crate::model::config::Config;

/// Error type for note management operations
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("could not launch '{command}': {source}")]
    Launch {
        command: String,
        source: io::Error,
    },
    #[error("'{command}' exited with an error")]
    CommandFailed { command: String },
}

/// Regex matches for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatches {
    pub path: PathBuf,
    /// (1-based line number, line text)
    pub matches: Vec<(usize, String)>,
}

/// Create `<note_root>/notes/<title>.md` with the standard header if it does
/// not exist yet, then open it in the editor.
pub fn create_note(config: &Config, title: &str, today: NaiveDate) -> Result<PathBuf, NoteError> {
    let notes_dir = config.note.root().join("notes");
    fs::create_dir_all(&notes_dir)?;

    let path = notes_dir.join(format!("{}.md", title));
    if !path.exists() {
        fs::write(&path, format!("{}\n", daily::header(today)))?;
    }

    open_in_editor(&config.general.editor, &path)?;
    Ok(path)
}

/// Launch the configured editor on a file and wait for it to exit.
pub fn open_in_editor(editor: &str, path: &Path) -> Result<(), NoteError> {
    let status = Command::new(editor)
        .arg(path)
        .status()
        .map_err(|source| NoteError::Launch {
            command: editor.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(NoteError::CommandFailed {
            command: editor.to_string(),
        });
    }
    Ok(())
}

/// Names of the entries in `<note_root>/notes/`, sorted.
pub fn list_notes(note_root: &Path) -> Result<Vec<String>, NoteError> {
    let dir = note_root.join("notes");
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Walk the given directories and collect every line matching the pattern,
/// grouped per file in sorted path order. Missing directories contribute
/// nothing.
pub fn grep_walk(dirs: &[PathBuf], pattern: &Regex) -> Result<Vec<FileMatches>, NoteError> {
    let mut results = Vec::new();
    for dir in dirs {
        if dir.is_dir() {
            grep_into(dir, pattern, &mut results)?;
        }
    }
    Ok(results)
}

fn grep_into(
    dir: &Path,
    pattern: &Regex,
    results: &mut Vec<FileMatches>,
) -> Result<(), NoteError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            grep_into(&path, pattern, results)?;
            continue;
        }

        let Ok(text) = fs::read_to_string(&path) else {
            tracing::warn!(path = %path.display(), "skipping unreadable file");
            continue;
        };

        let matches: Vec<(usize, String)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| pattern.is_match(line))
            .map(|(n, line)| (n + 1, line.to_string()))
            .collect();

        if !matches.is_empty() {
            results.push(FileMatches { path, matches });
        }
    }
    Ok(())
}

/// Search with the user's external tool instead of the built-in walk; the
/// tool prints its own matches.
pub fn grep_external(tool: &str, dirs: &[PathBuf], pattern: &str) -> Result<(), NoteError> {
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        // Non-zero exit just means no matches in this directory
        Command::new(tool)
            .arg(pattern)
            .current_dir(dir)
            .status()
            .map_err(|source| NoteError::Launch {
                command: tool.to_string(),
                source,
            })?;
    }
    Ok(())
}

/// Push the note root to its git remote: add everything, commit with a dated
/// message, push. A commit with nothing to commit is reported, not fatal.
pub fn sync_notes(note_root: &Path, today: NaiveDate) -> Result<(), NoteError> {
    use chrono::Datelike;

    output::success("Pushing notes to remote repo...");
    git(note_root, &["add", "-A"], true)?;

    let message = format!(
        "Updating notes: {}/{}/{}",
        today.month(),
        today.day(),
        today.year()
    );
    if !git(note_root, &["commit", "-m", &message], false)? {
        output::notice("Nothing new to commit");
    }

    git(note_root, &["push"], true)?;
    Ok(())
}

/// Run a git step in `dir`, returning whether it succeeded. With `required`
/// a failure becomes an error.
fn git(dir: &Path, args: &[&str], required: bool) -> Result<bool, NoteError> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .map_err(|source| NoteError::Launch {
            command: "git".to_string(),
            source,
        })?;

    if required && !status.success() {
        return Err(NoteError::CommandFailed {
            command: format!("git {}", args.join(" ")),
        });
    }
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_list_notes_sorted() {
        let tmp = TempDir::new().unwrap();
        let notes = tmp.path().join("notes");
        fs::create_dir_all(&notes).unwrap();
        fs::write(notes.join("zebra.md"), "z").unwrap();
        fs::write(notes.join("alpha.md"), "a").unwrap();

        assert_eq!(
            list_notes(tmp.path()).unwrap(),
            vec!["alpha.md".to_string(), "zebra.md".to_string()]
        );
    }

    #[test]
    fn test_list_notes_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(list_notes(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_grep_walk_groups_matches_by_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.md"), "one fish\ntwo fish\nred herring\n").unwrap();
        fs::write(dir.join("sub/b.md"), "blue fish\n").unwrap();
        fs::write(dir.join("c.md"), "no match here\n").unwrap();

        let re = Regex::new("fish").unwrap();
        let results = grep_walk(&[dir.clone()], &re).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, dir.join("a.md"));
        assert_eq!(
            results[0].matches,
            vec![(1, "one fish".to_string()), (2, "two fish".to_string())]
        );
        assert_eq!(results[1].path, dir.join("sub/b.md"));
    }

    #[test]
    fn test_grep_walk_missing_dirs_are_empty() {
        let tmp = TempDir::new().unwrap();
        let re = Regex::new("x").unwrap();
        let results = grep_walk(&[tmp.path().join("nope")], &re).unwrap();
        assert!(results.is_empty());
    }
}
