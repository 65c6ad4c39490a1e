use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use beacon_connect::request::{
    BeaconRequest, Collaborators, EngineConfig, Interaction, PermissionScope, RequestWorkflow,
};
use tracing::{debug, info, warn};
use vault_wallet::{WalletError, aggregate};

use crate::cli::RequestArgs;
use crate::commands::common::{print_transactions, read_json_arg};
use crate::config::{default_wallets_path, load_engine_config};
use crate::offline::{FileWalletDirectory, OfflineProtocols, StdoutSink, TerminalSurface};
use crate::ui::prompt_confirm;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Confirm,
    Cancel,
    Prompt,
}

impl Decision {
    fn from_args(args: &RequestArgs) -> Self {
        if args.yes {
            Self::Confirm
        } else if args.cancel {
            Self::Cancel
        } else {
            Self::Prompt
        }
    }
}

pub async fn run(args: RequestArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_engine_config(config_path)?;
    let wallets_path = args.wallets.clone().unwrap_or_else(default_wallets_path);
    let request: BeaconRequest = read_json_arg(&args.request, "request")?;
    info!(
        "request command: id={}, kind={:?}, wallets={}",
        request.id(),
        request.kind(),
        wallets_path.display()
    );

    let sink = Arc::new(StdoutSink::default());
    let surface = Arc::new(TerminalSurface::default());
    let result = handle(
        config,
        &wallets_path,
        request,
        Decision::from_args(&args),
        &args.drop_scopes,
        sink.clone(),
        surface.clone(),
    )
    .await;
    debug!(
        "request command finished: events={}, errors_shown={}",
        sink.events().len(),
        surface.shown().len()
    );
    result
}

async fn handle(
    config: EngineConfig,
    wallets_path: &Path,
    request: BeaconRequest,
    decision: Decision,
    drop_scopes: &[PermissionScope],
    sink: Arc<StdoutSink>,
    surface: Arc<TerminalSurface>,
) -> Result<()> {
    let wallets = FileWalletDirectory::load(wallets_path)?;
    let workflow = RequestWorkflow::new(
        config.clone(),
        Collaborators {
            protocols: Arc::new(OfflineProtocols::new(config.chain)),
            wallets: Arc::new(wallets),
            transport: sink.clone(),
            channel: sink,
            surface,
        },
    );

    let mut interaction = workflow
        .receive(request)
        .await
        .map_err(WalletError::from)
        .context("request could not be handled")?;
    describe(&interaction);

    for scope in drop_scopes {
        if !interaction.set_scope(*scope, false) {
            warn!("scope {} is not offered by this request", scope.name());
        }
    }

    let confirmed = match decision {
        Decision::Confirm => true,
        Decision::Cancel => false,
        Decision::Prompt => prompt_confirm("Confirm request?")?,
    };
    debug!("request decision: confirmed={confirmed}");

    let (outcome, action) = if confirmed {
        (workflow.confirm(&mut interaction).await, "confirmation")
    } else {
        (workflow.cancel(&mut interaction).await, "cancellation")
    };
    if let Err(err) = outcome {
        if !interaction.phase().is_terminal() {
            warn!(
                "request {} left open in phase {:?}",
                interaction.request().id(),
                interaction.phase()
            );
        }
        return Err(WalletError::from(err)).with_context(|| format!("{action} failed"));
    }
    Ok(())
}

fn describe(interaction: &Interaction) {
    println!(
        "{} from {}",
        interaction.title_key(),
        interaction.requester_name()
    );
    if let Some(address) = interaction.address() {
        println!("Address: {address}");
    }
    if let Some(network) = interaction.network() {
        println!("Network: {}", network.network_type.as_str());
    }
    if let Some(id) = interaction.correlation_id() {
        println!("Correlation id: {id}");
    }
    if let Some(hash) = interaction.ledger_hash() {
        println!("Ledger hash: {hash}");
    }
    if !interaction.scopes().is_empty() {
        println!("Scopes:");
        for input in interaction.scopes() {
            let mark = if input.checked { "x" } else { " " };
            println!("  [{mark}] {}", input.name());
        }
    }
    if !interaction.transactions().is_empty() {
        print_transactions(interaction.transactions());
        if let Some(info) = aggregate(interaction.transactions()) {
            println!(
                "Total: amount={}, fees={}",
                info.total_amount, info.total_fees
            );
        }
    }
}
