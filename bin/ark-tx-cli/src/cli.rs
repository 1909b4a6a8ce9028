use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secp256k1::PublicKey;

#[derive(Parser)]
#[command(
    name = "ark-tx-cli",
    about = "Builds unsigned boarding, commitment and forfeit transactions",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Boarding(TemplateArgs),

    Commitment(TemplateArgs),

    Forfeit(TemplateArgs),

    Aggregate(AggregateArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Build a transaction template from a params file", version)]
pub(crate) struct TemplateArgs {
    #[arg(long, env = "ARK_TX_PARAMS", help = "the path to the params file")]
    pub(crate) params: PathBuf,

    #[arg(long, help = "print the template as JSON")]
    pub(crate) json: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Aggregate public keys into a single key", version)]
pub(crate) struct AggregateArgs {
    #[arg(
        long = "pubkey",
        required = true,
        value_parser = parse_pubkey,
        help = "a compressed public key in hex, may be repeated"
    )]
    pub(crate) pubkeys: Vec<PublicKey>,

    #[arg(long, help = "print the key as JSON")]
    pub(crate) json: bool,
}

fn parse_pubkey(s: &str) -> Result<PublicKey, String> {
    let bytes = hex::decode(s).map_err(|e| format!("invalid hex: {e}"))?;

    PublicKey::from_slice(&bytes).map_err(|e| format!("invalid public key: {e}"))
}
