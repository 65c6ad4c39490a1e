use anyhow::Result;
use beacon_connect::request::ReviewableTransaction;
use tracing::debug;
use vault_wallet::aggregate;

use crate::cli::AggregateArgs;
use crate::commands::common::{print_transactions, read_json_arg};

pub fn run(args: AggregateArgs) -> Result<()> {
    let transactions: Vec<ReviewableTransaction> =
        read_json_arg(&args.transactions, "transactions")?;
    debug!("aggregate command: {} transaction(s)", transactions.len());

    print_transactions(&transactions);
    match aggregate(&transactions) {
        Some(info) => println!(
            "Total: {} transaction(s), amount={}, fees={}",
            info.count, info.total_amount, info.total_fees
        ),
        None => println!("No aggregate: needs two or more transactions of one protocol."),
    }
    Ok(())
}
