//! # oneget
//!
//! Fetches one URL with a single blocking HTTP GET, prints the response and
//! exits. Exit status is 0 on success and 1 on a usage error or any failure.

mod cmd_args;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use oneget_core::Client;
use tracing::Level;

use crate::cmd_args::CommandLineArgs;

fn main() -> ExitCode {
    let args = match CommandLineArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // clap renders usage on stderr for errors, stdout for help/version
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(args.log_level());
    tracing::debug!(url = args.url(), verbose = args.verbose(), "starting");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("request failed: {e:?}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CommandLineArgs) -> Result<()> {
    let client = Client::new().context("failed to set up TLS")?;
    let response = client
        .get(args.url())
        .with_context(|| format!("GET {} failed", args.url()))?;

    // The client already echoed the response while the request ran.
    let mut out = io::stdout().lock();
    response
        .write_to(&mut out)
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush())
        .context("failed to write response")
}
