//! Main entry point for tweetstats.

use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tweetstats::{resolve_config, App, AppResult, Cli, RunOutcome};
use tweetstats_common::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("tweetstats failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> AppResult<RunOutcome> {
    let config = resolve_config(cli)?;
    init_logging(config.logging.to_logging_config())?;
    info!("Starting tweetstats {}", env!("CARGO_PKG_VERSION"));

    let app = App::new(config)?;
    let stdout = io::stdout();
    app.run(&mut stdout.lock())
}
