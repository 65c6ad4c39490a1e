mod cli;
mod commands;
mod config;
mod logging;
mod offline;
mod ui;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Validate(args) => commands::validate::run(args),
        Command::Aggregate(args) => commands::aggregate::run(args),
        Command::Request(args) => commands::request::run(args, cli.config.as_deref()).await,
    }
}
