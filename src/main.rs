use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pa::cli::commands::Cli;
use pa::cli::handlers;
use pa::cli::output;

fn main() {
    let layer = fmt::layer().compact();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    tracing_subscriber::registry().with(layer).with(filter).init();

    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        output::error(&format!("error: {}", e));
        std::process::exit(1);
    }
}
