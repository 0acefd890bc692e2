// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rollup: inspect stored job-progress trees

mod color;
mod commands;
mod exit_error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::show::{self, ShowArgs};

/// Log filter variable, in `RUST_LOG` syntax
const LOG_ENV: &str = "ROLLUP_LOG";

#[derive(Parser)]
#[command(
    name = "rollup",
    version,
    about = "Inspect stored job-progress trees",
    styles = color::styles()
)]
struct Cli {
    /// Tracker store snapshot (defaults to ROLLUP_STORE or the state directory)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a tracker and its descendants
    Show(ShowArgs),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_error::exit_code(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let store = match cli.store {
        Some(path) => path,
        None => rollup_storage::store_path()?,
    };
    tracing::debug!(store = %store.display(), "using tracker store");
    match cli.command {
        Commands::Show(args) => show::handle(args, &store),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
