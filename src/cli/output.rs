use ansi_term::Colour;

use crate::ops::note_ops::FileMatches;

/// Green line for things that were created or added
pub fn success(msg: &str) {
    println!("{}", Colour::Green.paint(msg));
}

/// Yellow line for state changes and skips worth noticing
pub fn notice(msg: &str) {
    println!("{}", Colour::Yellow.paint(msg));
}

/// Red line on stderr; reporting only, never aborts the caller
pub fn error(msg: &str) {
    eprintln!("{}", Colour::Red.paint(msg));
}

/// Print grep results: a `[path]` header per file, then `lineno: line`
pub fn print_matches(results: &[FileMatches]) {
    for file in results {
        println!("\n[{}]", file.path.display());
        for (lineno, line) in &file.matches {
            println!("{}: {}", lineno, line.trim_end());
        }
    }
}
