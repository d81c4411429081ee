pub mod todo_line;

pub use todo_line::{classify_line, render_line, render_todo};
