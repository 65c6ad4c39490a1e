use anyhow::{Context, Result};
use beacon_connect::request::ReviewableTransaction;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::inline_or_file;

/// Parses inline JSON or an `@path` argument.
pub fn read_json_arg<T: DeserializeOwned>(value: &str, what: &str) -> Result<T> {
    let raw = inline_or_file(value)?;
    debug!("read {what}: {} byte(s)", raw.len());
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {what} JSON"))
}

pub fn print_transactions(transactions: &[ReviewableTransaction]) {
    println!("Transactions ({}):", transactions.len());
    for (idx, tx) in transactions.iter().enumerate() {
        println!(
            "  {}. {} -> {} amount={} fee={} protocol={}",
            idx + 1,
            tx.from.join(","),
            tx.to.join(","),
            tx.amount,
            tx.fee,
            tx.protocol
        );
    }
}
