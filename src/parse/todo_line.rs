use std::sync::LazyLock;

use regex::Regex;

use crate::model::todo::{Line, TodoLine, TodoState};

/// The one pattern all TODO-line recognition funnels through:
/// `- [<state>] ` optionally followed by `(<id>) `, then the item text.
/// A line that fails to match is opaque content and is never rewritten.
static TODO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[( |x|-)\] (?:\((0|[1-9]\d*)\) )?(.*)$").unwrap());

/// Classify a single line of a daily note file.
///
/// Anything that does not match the exact item encoding — unknown checkbox
/// characters, id markup that is not a plain integer, headers, prose — comes
/// back as [`Line::Other`] holding the original text verbatim.
pub fn classify_line(raw: &str) -> Line {
    let Some(caps) = TODO_LINE.captures(raw) else {
        return Line::Other(raw.to_string());
    };

    let Some(state) = caps[1].chars().next().and_then(TodoState::from_checkbox_char) else {
        return Line::Other(raw.to_string());
    };

    let remote_id = match caps.get(2) {
        // An id too large to represent is not an id we assigned
        Some(m) => match m.as_str().parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => return Line::Other(raw.to_string()),
        },
        None => None,
    };

    Line::Todo(TodoLine {
        state,
        remote_id,
        content: caps[3].to_string(),
    })
}

/// Serialize a TODO item back into its line encoding.
///
/// Inverse of [`classify_line`] for recognized items: classify → render is
/// byte-identical.
pub fn render_todo(todo: &TodoLine) -> String {
    match todo.remote_id {
        Some(id) => format!("- [{}] ({}) {}", todo.state.checkbox_char(), id, todo.content),
        None => format!("- [{}] {}", todo.state.checkbox_char(), todo.content),
    }
}

/// Serialize any line, recognized or not.
pub fn render_line(line: &Line) -> String {
    match line {
        Line::Todo(todo) => render_todo(todo),
        Line::Other(raw) => raw.clone(),
    }
}
