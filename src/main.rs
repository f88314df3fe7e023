#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! lsopentmf — list OpenTMF drivers and the instruments they see.

mod cli;
mod commands;
mod opentmf;
mod types;

use std::io;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use cli::{Cli, OutputCtx, report_parse_error};
use commands::{ListOptions, RunStatus};
use opentmf::{Api, Context};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => std::process::exit(report_parse_error(&err)),
    };

    match try_main(&cli) {
        Ok(status) => std::process::exit(status.code()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(RunStatus::Failure.code());
        }
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<RunStatus> {
    let ctx = OutputCtx::new(cli.verbosity(), cli.json, cli.debug);

    let library = cli
        .library
        .clone()
        .map_or_else(opentmf::default_library_name, PathBuf::into_os_string);
    let api = match Api::load(&library) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("Error loading library: {err}");
            return Ok(RunStatus::Failure);
        }
    };

    let opts = ListOptions {
        show_devices: cli.devices,
    };
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let status = commands::run(opts, &ctx, || Context::init(&api), &mut out, &mut err)
        .context("writing driver listing")?;
    io::Write::flush(&mut out).context("flushing standard output")?;
    Ok(status)
}
