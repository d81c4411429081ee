use clap::{Args, Parser, Subcommand};

/// Built-in command registry: name and one-line summary, known at build
/// time. Plugins discovered from descriptor files extend this at runtime.
pub const BUILT_INS: &[(&str, &str)] = &[
    ("commands", "List built-in commands and discovered plugins"),
    ("init", "Write the default config file"),
    ("note", "Create and search markdown note files"),
    ("todo", "Manage today's TODO list and sync it with Todoist"),
    ("toggl", "Manage toggl timers and view breakdowns"),
];

#[derive(Parser)]
#[command(name = "pa", about = concat!("pa v", env!("CARGO_PKG_VERSION"), " - a personal assistant for your command line"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use an alternate config file (must precede the sub-command)
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default config file
    Init(InitArgs),
    /// Manage today's TODO list and sync it with Todoist
    Todo(TodoCmd),
    /// Create and search markdown note files
    Note(NoteCmd),
    /// Manage toggl timers and view breakdowns
    Toggl(TogglCmd),
    /// List built-in commands and discovered plugins
    Commands,
    /// Anything else is dispatched to a plugin
    #[command(external_subcommand)]
    External(Vec<String>),
}

// ---------------------------------------------------------------------------
// todo
// ---------------------------------------------------------------------------

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct TodoCmd {
    #[command(subcommand)]
    pub action: Option<TodoAction>,

    /// Text for a new TODO added to today's file
    #[arg(trailing_var_arg = true)]
    pub text: Vec<String>,
}

#[derive(Subcommand)]
pub enum TodoAction {
    /// List outstanding TODOs
    List,
    /// Open today's TODO file in your editor
    Open,
    /// Sync the local TODO file with Todoist
    Sync,
}

// ---------------------------------------------------------------------------
// note
// ---------------------------------------------------------------------------

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct NoteCmd {
    #[command(subcommand)]
    pub action: Option<NoteAction>,

    /// Title for a new note to create and open
    pub title: Option<String>,
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// List the contents of your notes directory
    List,
    /// Search your notes and daily notes for a pattern
    Grep(GrepArgs),
    /// Push the note root to its git remote
    Sync,
}

#[derive(Args)]
pub struct GrepArgs {
    /// Regex pattern to search for
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// toggl
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TogglCmd {
    #[command(subcommand)]
    pub action: TogglAction,
}

#[derive(Subcommand)]
pub enum TogglAction {
    /// Show the current timer status
    Status,
    /// Start a timer for a project
    Start(TogglStartArgs),
    /// Stop the running timer
    Stop,
    /// Hours per project for a period: [d]ay, [w]eek, [m]onth or [y]ear
    Breakdown(TogglBreakdownArgs),
}

#[derive(Args)]
pub struct TogglStartArgs {
    /// Project to track time against
    pub project: String,
    /// Description of what you are working on
    #[arg(trailing_var_arg = true)]
    pub details: Vec<String>,
}

#[derive(Args)]
pub struct TogglBreakdownArgs {
    /// Period to report on: d, w, m or y
    pub period: String,
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}
