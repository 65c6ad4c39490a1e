use std::sync::Arc;

use async_trait::async_trait;
use vault_chain::{Network, ProtocolSymbol};

use super::error::{ErrorReport, ProtocolResult, TransportResult};
use super::types::{
    BeaconResponse, ForgedOperation, Handoff, HandoffKey, OperationIntent, ReviewableTransaction,
    WalletRef, WrappedOperation,
};

/// Chain protocol operations the engine relies on. Construction rules and
/// signing primitives live behind this trait.
#[async_trait]
pub trait ProtocolService: Send + Sync {
    fn identifier(&self) -> ProtocolSymbol;

    fn network(&self) -> Network;

    async fn prepare_operation(
        &self,
        public_key: &str,
        intents: &[OperationIntent],
    ) -> ProtocolResult<WrappedOperation>;

    async fn forge(&self, operation: &WrappedOperation) -> ProtocolResult<ForgedOperation>;

    async fn decode_forged(
        &self,
        public_key: &str,
        forged: &ForgedOperation,
    ) -> ProtocolResult<Vec<ReviewableTransaction>>;

    async fn decode_signed(&self, signed: &str) -> ProtocolResult<Vec<ReviewableTransaction>>;
}

#[async_trait]
pub trait ProtocolFactory: Send + Sync {
    /// Protocol instance for the canonical mainnet.
    fn default_protocol(&self) -> Arc<dyn ProtocolService>;

    async fn protocol_for_network(
        &self,
        network: &Network,
    ) -> ProtocolResult<Arc<dyn ProtocolService>>;
}

/// Read-only view of the accounts known to the wallet.
#[async_trait]
pub trait WalletDirectory: Send + Sync {
    async fn list_wallets(&self) -> Vec<WalletRef>;
}

/// Peer messaging channel the original request arrived on.
#[async_trait]
pub trait BeaconTransport: Send + Sync {
    async fn respond(&self, response: BeaconResponse) -> TransportResult<()>;

    async fn send_aborted(&self, request_id: &str) -> TransportResult<()>;
}

/// Key/value hand-off to whichever surface performs the next step.
#[async_trait]
pub trait InteractionChannel: Send + Sync {
    fn put(&self, key: HandoffKey, value: Handoff);

    async fn navigate(&self, route: &str) -> TransportResult<()>;
}

/// User-facing surface hosting the interaction.
#[async_trait]
pub trait InteractionSurface: Send + Sync {
    async fn show_error(&self, report: &ErrorReport) -> TransportResult<()>;

    async fn dismiss(&self) -> TransportResult<()>;
}
