//! CLI that builds unsigned Ark transaction templates from TOML parameter files.

mod cli;
mod handlers;
mod params;

use anyhow::{Error, Result};
use ark_tx_common::logging::{self, LoggerConfig};
use clap::Parser;
use handlers::Render;

fn main() -> Result<(), Error> {
    // stdout carries the templates.
    logging::init(LoggerConfig::with_base_name("ark-tx-cli").with_stderr());

    let cli = cli::Cli::parse();
    let output = match cli.command {
        cli::Commands::Boarding(args) => {
            handlers::handle_boarding(&args.params)?.render(args.json)?
        }
        cli::Commands::Commitment(args) => {
            handlers::handle_commitment(&args.params)?.render(args.json)?
        }
        cli::Commands::Forfeit(args) => {
            handlers::handle_forfeit(&args.params)?.render(args.json)?
        }
        cli::Commands::Aggregate(args) => {
            handlers::handle_aggregate(&args.pubkeys)?.render(args.json)?
        }
    };

    println!("{output}");

    Ok(())
}
