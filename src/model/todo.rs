/// Checkbox state of a TODO line.
///
/// Only three states exist in daily note files: `Migrated` marks an item
/// that was carried forward to a later day and must never be picked up
/// again by migration or sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoState {
    Open,
    Done,
    Migrated,
}

impl TodoState {
    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TodoState::Open => ' ',
            TodoState::Done => 'x',
            TodoState::Migrated => '-',
        }
    }

    /// Parse a checkbox character into a state
    pub fn from_checkbox_char(c: char) -> Option<TodoState> {
        match c {
            ' ' => Some(TodoState::Open),
            'x' => Some(TodoState::Done),
            '-' => Some(TodoState::Migrated),
            _ => None,
        }
    }
}

/// A recognized TODO item line from a daily note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoLine {
    pub state: TodoState,
    /// Remote task id carried inline as `(<id>)` directly after the checkbox.
    /// Absent for purely local items.
    pub remote_id: Option<u64>,
    /// Description text with the id markup stripped.
    pub content: String,
}

impl TodoLine {
    pub fn new(state: TodoState, remote_id: Option<u64>, content: impl Into<String>) -> Self {
        TodoLine {
            state,
            remote_id,
            content: content.into(),
        }
    }

    /// A fresh open item with no remote linkage.
    pub fn open(content: impl Into<String>) -> Self {
        TodoLine::new(TodoState::Open, None, content)
    }

    /// The same item re-emitted as open, keeping any remote linkage.
    /// Used when migrating an item into today's file.
    pub fn reopened(&self) -> TodoLine {
        TodoLine::new(TodoState::Open, self.remote_id, self.content.clone())
    }
}

/// One line of a daily note file: either a recognized TODO item or opaque
/// text (headers, prose, malformed items) preserved byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Todo(TodoLine),
    Other(String),
}

impl Line {
    pub fn as_todo(&self) -> Option<&TodoLine> {
        match self {
            Line::Todo(todo) => Some(todo),
            Line::Other(_) => None,
        }
    }

    pub fn as_todo_mut(&mut self) -> Option<&mut TodoLine> {
        match self {
            Line::Todo(todo) => Some(todo),
            Line::Other(_) => None,
        }
    }
}
