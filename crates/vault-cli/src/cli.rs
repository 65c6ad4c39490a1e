use std::path::PathBuf;

use beacon_connect::request::{PermissionScope, SigningType};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vault-cli")]
#[command(about = "Handle wallet-interaction requests offline")]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Engine configuration (JSON). Defaults to ~/.vault-core/engine.json when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a hex payload against a signing type.
    Validate(ValidateArgs),
    /// Sum amounts and fees of a batch of reviewable transactions.
    Aggregate(AggregateArgs),
    /// Handle one request and confirm or cancel it.
    Request(RequestArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[arg(long = "type", value_name = "raw|operation|micheline", value_parser = parse_signing_type, default_value = "raw")]
    pub signing_type: SigningType,
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// JSON array of transactions, or `@path` to read it from a file.
    pub transactions: String,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// JSON request, or `@path` to read it from a file.
    pub request: String,
    /// JSON array of wallets. Defaults to ~/.vault-core/wallets.json.
    #[arg(long)]
    pub wallets: Option<PathBuf>,
    #[arg(long, conflicts_with = "cancel")]
    pub yes: bool,
    #[arg(long)]
    pub cancel: bool,
    /// Uncheck a requested permission scope before confirming.
    #[arg(long = "drop-scope", value_parser = parse_scope)]
    pub drop_scopes: Vec<PermissionScope>,
}

fn parse_signing_type(value: &str) -> Result<SigningType, String> {
    match value.to_ascii_lowercase().as_str() {
        "raw" => Ok(SigningType::Raw),
        "operation" => Ok(SigningType::Operation),
        "micheline" => Ok(SigningType::Micheline),
        _ => Err(format!(
            "unsupported signing type '{value}'; expected raw, operation, or micheline"
        )),
    }
}

fn parse_scope(value: &str) -> Result<PermissionScope, String> {
    PermissionScope::ALL
        .into_iter()
        .find(|scope| scope.name() == value)
        .ok_or_else(|| format!("unknown permission scope '{value}'"))
}
