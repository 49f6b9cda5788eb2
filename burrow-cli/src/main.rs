//! Burrow CLI
//!
//! Runs a single command in new network, UTS, mount, IPC, PID and user
//! namespaces and exits with the command's exit code.

use anyhow::Result;
use burrow_core::{CommandSpec, Error};
use burrow_namespace::Launcher;
use clap::Parser;
use clap::error::ErrorKind;
use std::process;
use tracing::Level;

mod cli;

use cli::Cli;

/// Exit code for every failure the launcher itself detects
const FAILURE_EXIT_CODE: i32 = 1;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => process::exit(usage_error(&e)),
    };

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            process::exit(FAILURE_EXIT_CODE);
        }
    }
}

/// Launch the command and return the exit code to propagate
fn run(cli: &Cli) -> Result<i32> {
    let command = CommandSpec::new(cli.command.iter().map(String::as_str))?;
    let launcher = Launcher::new(cli.namespace_config());

    let outcome = launcher.launch(&command)?;
    tracing::debug!(%outcome, "Command finished");

    Ok(outcome.exit_code())
}

/// Report an argument error and pick the exit code
fn usage_error(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        ErrorKind::MissingRequiredArgument => {
            eprintln!("{}", Error::Usage);
            eprintln!("Usage: burrow [OPTIONS] <COMMAND>...");
            FAILURE_EXIT_CODE
        }
        _ => {
            eprint!("{e}");
            FAILURE_EXIT_CODE
        }
    }
}
