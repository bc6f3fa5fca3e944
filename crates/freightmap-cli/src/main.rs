//! Freightmap - live cargo and driver map
//!
//! Polls the marketplace marker feed, filters it, and raises nearby cargo
//! notifications in the terminal.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
