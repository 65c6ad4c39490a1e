use std::sync::Arc;

use tracing::debug;
use vault_chain::{Network, ProtocolSymbol};

use super::collaborators::{ProtocolFactory, ProtocolService, WalletDirectory};
use super::error::ResolutionError;
use super::types::WalletRef;

pub struct WalletResolver {
    directory: Arc<dyn WalletDirectory>,
}

impl WalletResolver {
    pub fn new(directory: Arc<dyn WalletDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the first wallet whose protocol matches `symbol`.
    ///
    /// There is no wallet selection: when several accounts share a protocol
    /// the one listed first wins.
    pub async fn resolve(&self, symbol: ProtocolSymbol) -> Result<WalletRef, ResolutionError> {
        let wallets = self.directory.list_wallets().await;
        debug!("resolve wallet: protocol={symbol}, candidates={}", wallets.len());
        wallets
            .into_iter()
            .find(|wallet| wallet.protocol == symbol)
            .ok_or(ResolutionError::NoWallet(symbol))
    }
}

/// Picks the protocol instance for `network`. Mainnet requests use the
/// factory default; every other network type is resolved explicitly.
pub async fn resolve_protocol(
    factory: &dyn ProtocolFactory,
    network: &Network,
) -> Result<Arc<dyn ProtocolService>, ResolutionError> {
    if network.is_mainnet() {
        return Ok(factory.default_protocol());
    }

    debug!(
        "resolve protocol: network_type={}, name={:?}",
        network.network_type.as_str(),
        network.name
    );
    factory
        .protocol_for_network(network)
        .await
        .map_err(|source| ResolutionError::protocol(network.network_type, source))
}
