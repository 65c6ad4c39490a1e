use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use beacon_connect::request::error::{ErrorReport, ProtocolError, ProtocolResult, TransportResult};
use beacon_connect::request::types::{
    BeaconResponse, ForgedOperation, Handoff, HandoffKey, OperationIntent, ReviewableTransaction,
    WalletRef, WrappedOperation,
};
use beacon_connect::request::{
    BeaconTransport, InteractionChannel, InteractionSurface, ProtocolFactory, ProtocolService,
    TransportError, WalletDirectory,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use vault_chain::{Network, ProtocolSymbol};
use vault_wallet::{WalletError, WalletResult};

const OFFLINE_REASON: &str = "no chain node configured in offline mode";

/// Wallets read once from a JSON array of `WalletRef`.
pub struct FileWalletDirectory {
    wallets: Vec<WalletRef>,
}

impl FileWalletDirectory {
    pub fn load(path: &Path) -> WalletResult<Self> {
        if !path.exists() {
            debug!("no wallet list at {}", path.display());
            return Ok(Self {
                wallets: Vec::new(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|err| WalletError::input("wallet list", err))?;
        let wallets: Vec<WalletRef> =
            serde_json::from_str(&raw).map_err(|err| WalletError::input("wallet list", err))?;
        debug!("loaded {} wallet(s) from {}", wallets.len(), path.display());
        Ok(Self { wallets })
    }
}

#[async_trait]
impl WalletDirectory for FileWalletDirectory {
    async fn list_wallets(&self) -> Vec<WalletRef> {
        self.wallets.clone()
    }
}

/// Protocol without a chain connection: it cannot build operations, and
/// signed transactions are relayed without a decoded review.
pub struct OfflineProtocol {
    identifier: ProtocolSymbol,
    network: Network,
}

#[async_trait]
impl ProtocolService for OfflineProtocol {
    fn identifier(&self) -> ProtocolSymbol {
        self.identifier
    }

    fn network(&self) -> Network {
        self.network.clone()
    }

    async fn prepare_operation(
        &self,
        _public_key: &str,
        _intents: &[OperationIntent],
    ) -> ProtocolResult<WrappedOperation> {
        Err(ProtocolError::Unavailable(OFFLINE_REASON.into()))
    }

    async fn forge(&self, _operation: &WrappedOperation) -> ProtocolResult<ForgedOperation> {
        Err(ProtocolError::Unavailable(OFFLINE_REASON.into()))
    }

    async fn decode_forged(
        &self,
        _public_key: &str,
        _forged: &ForgedOperation,
    ) -> ProtocolResult<Vec<ReviewableTransaction>> {
        Err(ProtocolError::Unavailable(OFFLINE_REASON.into()))
    }

    async fn decode_signed(&self, _signed: &str) -> ProtocolResult<Vec<ReviewableTransaction>> {
        Ok(Vec::new())
    }
}

pub struct OfflineProtocols {
    identifier: ProtocolSymbol,
}

impl OfflineProtocols {
    pub fn new(identifier: ProtocolSymbol) -> Self {
        Self { identifier }
    }
}

#[async_trait]
impl ProtocolFactory for OfflineProtocols {
    fn default_protocol(&self) -> Arc<dyn ProtocolService> {
        Arc::new(OfflineProtocol {
            identifier: self.identifier,
            network: Network::mainnet(),
        })
    }

    async fn protocol_for_network(
        &self,
        network: &Network,
    ) -> ProtocolResult<Arc<dyn ProtocolService>> {
        Ok(Arc::new(OfflineProtocol {
            identifier: self.identifier,
            network: network.clone(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Emitted {
    Response { response: BeaconResponse },
    Aborted { id: String },
    Handoff { key: String, route: String, value: Handoff },
}

/// Records what the engine emits and prints each event as a JSON line.
#[derive(Default)]
pub struct StdoutSink {
    staged: Mutex<Option<(HandoffKey, Handoff)>>,
    events: Mutex<Vec<Emitted>>,
}

impl StdoutSink {
    pub fn events(&self) -> Vec<Emitted> {
        self.events.lock().clone()
    }

    fn record(&self, event: Emitted) -> TransportResult<()> {
        let line = serde_json::to_string(&event)
            .map_err(|err| TransportError::Delivery(err.to_string()))?;
        println!("{line}");
        self.events.lock().push(event);
        Ok(())
    }
}

#[async_trait]
impl BeaconTransport for StdoutSink {
    async fn respond(&self, response: BeaconResponse) -> TransportResult<()> {
        self.record(Emitted::Response { response })
    }

    async fn send_aborted(&self, request_id: &str) -> TransportResult<()> {
        self.record(Emitted::Aborted {
            id: request_id.to_owned(),
        })
    }
}

#[async_trait]
impl InteractionChannel for StdoutSink {
    fn put(&self, key: HandoffKey, value: Handoff) {
        *self.staged.lock() = Some((key, value));
    }

    async fn navigate(&self, route: &str) -> TransportResult<()> {
        let Some((key, value)) = self.staged.lock().take() else {
            return Err(TransportError::Navigation {
                route: route.to_owned(),
                reason: "nothing staged".into(),
            });
        };
        self.record(Emitted::Handoff {
            key: key.as_str().to_owned(),
            route: route.to_owned(),
            value,
        })
    }
}

/// Prints errors to stderr; dismissal only logs.
#[derive(Default)]
pub struct TerminalSurface {
    shown: Mutex<Vec<ErrorReport>>,
}

impl TerminalSurface {
    pub fn shown(&self) -> Vec<ErrorReport> {
        self.shown.lock().clone()
    }
}

#[async_trait]
impl InteractionSurface for TerminalSurface {
    async fn show_error(&self, report: &ErrorReport) -> TransportResult<()> {
        eprintln!("{}: {}", report.title, report.message);
        self.shown.lock().push(report.clone());
        Ok(())
    }

    async fn dismiss(&self) -> TransportResult<()> {
        debug!("interaction dismissed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn wallet_list_is_read_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "protocolIdentifier": "xtz", "publicKey": "edpk1", "address": "tz1a" }}]"#
        )
        .unwrap();

        let directory = FileWalletDirectory::load(file.path()).unwrap();
        let wallets = directory.list_wallets().await;
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].protocol, ProtocolSymbol::Xtz);
        assert_eq!(wallets[0].public_key, "edpk1");
    }

    #[tokio::test]
    async fn missing_wallet_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let directory = FileWalletDirectory::load(&dir.path().join("wallets.json")).unwrap();
        assert!(directory.list_wallets().await.is_empty());
    }

    #[test]
    fn malformed_wallet_list_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let err = FileWalletDirectory::load(file.path())
            .err()
            .expect("object is not a list");
        assert_eq!(err.code(), "VALIDATION");
        assert!(err.to_string().starts_with("invalid wallet list"));
    }

    #[tokio::test]
    async fn offline_protocol_cannot_prepare() {
        let protocols = OfflineProtocols::new(ProtocolSymbol::Xtz);
        let protocol = protocols.default_protocol();
        assert!(protocol.network().is_mainnet());

        let err = protocol
            .prepare_operation("edpk", &[])
            .await
            .expect_err("offline");
        assert!(matches!(err, ProtocolError::Unavailable(_)));
        assert!(protocol.decode_signed("00").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn navigate_without_staged_value_fails() {
        let sink = StdoutSink::default();
        let err = sink
            .navigate("/transaction-confirm/transaction")
            .await
            .expect_err("nothing staged");
        assert!(matches!(err, TransportError::Navigation { .. }));
        assert!(sink.events().is_empty());
    }
}
