//! cookie-lens: inspect, decode and decrypt the JWT and JWE tokens stored
//! in cookies.
//!
//! Entry point for the application. Parses CLI arguments, loads the
//! config, sets up logging and delegates to the appropriate command
//! handler.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config;
mod core;
mod display;
mod error;
mod logging;
mod store;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::Context;
use config::Config;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, !cli.no_color && io::stderr().is_terminal());
    let config = Config::load(cli.config.as_deref())?;

    let use_color = !cli.no_color && config.ui.color && io::stdout().is_terminal();
    colored::control::set_override(use_color);

    let ctx = Context { config, use_color };
    let succeeded = match &cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, &ctx)?,
        Commands::Decode(args) => {
            commands::decode::execute(args, &ctx)?;
            true
        }
        Commands::Cookies(args) => commands::cookies::execute(args, &ctx)?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
