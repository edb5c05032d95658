//! Main entry point for gettext-tool.

use clap::Parser;
use gettext_common::init_logging;
use gettext_tool::{commands::logging_settings, run, Cli};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = logging_settings(&cli).to_logging_config();
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
