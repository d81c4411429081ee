use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::cli::output;
use crate::io::config_io;

/// `pa init`: write the default config, to the standard location or to the
/// `--config` override. Runs without loading any existing config so a broken
/// file can be replaced.
pub fn cmd_init(
    args: InitArgs,
    config_override: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match config_override {
        Some(p) => p.to_path_buf(),
        None => config_io::config_path(),
    };

    config_io::write_default(&path, args.force)?;
    output::success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}
