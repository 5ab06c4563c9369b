#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! `pg_lsclusters` — show information about the PostgreSQL clusters on this host.

mod cli;
mod cluster;
mod commands;
mod provider;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputCtx, write_error};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let ctx = OutputCtx::new(cli.json, cli.no_header, cli.debug);

    if let Err(err) = commands::list::run(&cli, &ctx) {
        tracing::debug!(error = ?err, "run failed");
        write_error(&err, cli.json);
        std::process::exit(err.exit_code());
    }
}

/// Diagnostics go to stderr: `warn` by default (or `RUST_LOG`), `debug` with `--debug`.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
