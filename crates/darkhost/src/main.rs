#![warn(missing_docs)]

//! Entry point for the `darkhost` binary.

mod cli;
mod error;
mod host;
mod script;
mod send;
mod settings;

use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Commands},
    error::{Error, Result},
    settings::LaunchSettings,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and either open the host window or
/// run the chosen subcommand.
fn run() -> Result<()> {
    let cli = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&cli.log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    match &cli.command {
        Some(Commands::Send(args)) => send::run(args),
        None => {
            let settings = LaunchSettings::from_cli(&cli);
            tracing::debug!(?settings, "launch settings");
            host::run(settings)
        }
    }
}
