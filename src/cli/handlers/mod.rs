mod init;
pub use init::cmd_init;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output;
use crate::io::{config_io, daily, plugins};
use crate::model::config::Config;
use crate::ops::{note_ops, todo_ops, toggl_ops};
use crate::remote::todoist::TodoistClient;
use crate::remote::toggl::TogglClient;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_override = cli.config.clone().map(PathBuf::from);
    let config_override = config_override.as_deref();
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Init(args) => cmd_init(args, config_override),
        Commands::Todo(cmd) => cmd_todo(cmd, config_override, today),
        Commands::Note(cmd) => cmd_note(cmd, config_override, today),
        Commands::Toggl(cmd) => cmd_toggl(cmd, config_override, today),
        Commands::Commands => cmd_commands(),
        Commands::External(argv) => cmd_external(argv),
    }
}

fn load_config(config_override: Option<&Path>) -> Result<Config, config_io::ConfigError> {
    config_io::load(config_override)
}

// ---------------------------------------------------------------------------
// todo
// ---------------------------------------------------------------------------

fn cmd_todo(
    cmd: TodoCmd,
    config_override: Option<&Path>,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_override)?;
    let note_root = config.note.root();

    // Any todo command on a new day migrates outstanding items first
    let todo_file = daily::ensure_today_file(&note_root, config.general.search_tool(), today)?;

    match cmd.action {
        Some(TodoAction::List) => {
            let daily_root = daily::daily_notes_dir(&note_root);
            search_dirs(&config, &[daily_root], daily::OPEN_MARKER_PATTERN)
        }
        Some(TodoAction::Open) => {
            note_ops::open_in_editor(&config.general.editor, &todo_file)?;
            Ok(())
        }
        Some(TodoAction::Sync) => {
            if !config.todoist.enabled {
                return Err("todoist functionality is not enabled".into());
            }
            let client = TodoistClient::from_config(&config.todoist)?;
            let outcome = todo_ops::sync(&todo_file, &client, today)?;
            if outcome.failures > 0 {
                output::notice(&format!(
                    "Sync finished with {} item(s) left for retry",
                    outcome.failures
                ));
            }
            Ok(())
        }
        None => {
            if cmd.text.is_empty() {
                return Err(
                    "nothing to do: pass TODO text or a subcommand (see 'pa todo --help')".into(),
                );
            }
            daily::append_todo(&todo_file, &cmd.text.join(" "))?;
            Ok(())
        }
    }
}

/// Search directories with the configured external tool when one is set,
/// otherwise the built-in walk.
fn search_dirs(
    config: &Config,
    dirs: &[PathBuf],
    pattern: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match config.general.search_tool() {
        Some(tool) => note_ops::grep_external(tool, dirs, pattern)?,
        None => {
            let re = Regex::new(pattern).map_err(note_ops::NoteError::Pattern)?;
            let results = note_ops::grep_walk(dirs, &re)?;
            output::print_matches(&results);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// note
// ---------------------------------------------------------------------------

fn cmd_note(
    cmd: NoteCmd,
    config_override: Option<&Path>,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_override)?;
    let note_root = config.note.root();

    match cmd.action {
        Some(NoteAction::List) => {
            output::success("Current notes:");
            for name in note_ops::list_notes(&note_root)? {
                println!("{}", name);
            }
            Ok(())
        }
        Some(NoteAction::Grep(args)) => {
            let dirs = [note_root.join("daily-notes"), note_root.join("notes")];
            search_dirs(&config, &dirs, &args.pattern)
        }
        Some(NoteAction::Sync) => {
            note_ops::sync_notes(&note_root, today)?;
            Ok(())
        }
        None => match cmd.title {
            Some(title) => {
                note_ops::create_note(&config, &title, today)?;
                Ok(())
            }
            None => {
                Err("nothing to do: pass a note title or a subcommand (see 'pa note --help')".into())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// toggl
// ---------------------------------------------------------------------------

fn cmd_toggl(
    cmd: TogglCmd,
    config_override: Option<&Path>,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_override)?;
    if !config.toggl.enabled {
        return Err("toggl functionality is not enabled".into());
    }
    let client = TogglClient::from_config(&config.toggl)?;

    match cmd.action {
        TogglAction::Status => {
            match client.current_entry()? {
                Some(entry) => {
                    let since = entry.start.with_timezone(&Local).format("%H:%M");
                    println!(
                        "Tracking \"{}\" since {}",
                        entry.description.as_deref().unwrap_or("(no description)"),
                        since
                    );
                }
                None => output::notice("No timer running"),
            }
            Ok(())
        }
        TogglAction::Start(args) => {
            let workspace = client.default_workspace()?;
            let project_id = client
                .projects(workspace.id)?
                .into_iter()
                .find(|p| p.name.eq_ignore_ascii_case(&args.project))
                .map(|p| p.id);
            if project_id.is_none() {
                output::notice(&format!(
                    "No toggl project named '{}', starting an unassigned timer",
                    args.project
                ));
            }

            let description = if args.details.is_empty() {
                args.project.clone()
            } else {
                args.details.join(" ")
            };
            client.start_entry(workspace.id, &description, project_id, Utc::now())?;
            output::success(&format!("Started timer: {}", description));
            Ok(())
        }
        TogglAction::Stop => {
            match client.current_entry()? {
                Some(entry) => {
                    client.stop_entry(entry.workspace_id, entry.id)?;
                    output::notice(&format!(
                        "Stopped \"{}\"",
                        entry.description.as_deref().unwrap_or("(no description)")
                    ));
                }
                None => output::notice("No timer running"),
            }
            Ok(())
        }
        TogglAction::Breakdown(args) => {
            let period = toggl_ops::Period::parse(&args.period)
                .ok_or("invalid period: expected [d]ay, [w]eek, [m]onth or [y]ear")?;

            let workspace = client.default_workspace()?;
            let projects: HashMap<u64, String> = client
                .projects(workspace.id)?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
            let entries =
                client.time_entries(period.start(today), today + chrono::Duration::days(1))?;

            for line in toggl_ops::render_breakdown(&toggl_ops::aggregate(&entries, &projects)) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// commands & plugins
// ---------------------------------------------------------------------------

fn cmd_commands() -> Result<(), Box<dyn std::error::Error>> {
    println!("Commands:");
    for (name, summary) in BUILT_INS {
        println!("  {:<10}  {}", name, summary);
    }

    let dir = plugins::plugins_dir();
    let found = plugins::discover(&dir);
    if !found.is_empty() {
        println!();
        println!("Plugins ({}):", dir.display());
        for plugin in &found {
            println!("  {:<10}  {}", plugin.name, plugin.descriptor.summary);
        }
    }
    Ok(())
}

fn cmd_external(argv: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let Some((name, args)) = argv.split_first() else {
        return Err("no command given".into());
    };

    let plugin = plugins::find(&plugins::plugins_dir(), name)?;
    let code = plugins::run(&plugin, args)?;
    std::process::exit(code);
}
