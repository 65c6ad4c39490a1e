use async_trait::async_trait;
use beacon_connect::request::types::{
    Handoff, InteractionData, InteractionInfo, MessageDefinition, MessageKind,
    ReviewableTransaction, SignedTransactionPayload, TransactionInfo, WalletRef,
};
use beacon_connect::request::{CorrelationId, Outbound, ResponseEmitter, TransportError};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use vault_chain::ProtocolSymbol;

/// Translation key used when a signer fails without any description.
pub const UNKNOWN_ERROR_ALERT_KEY: &str = "account-import-ledger.error-alert.unknown";
pub const ERROR_ALERT_HEADER_KEY: &str = "ledger-sign.error-alert.header";

/// Totals shown when several transactions of one protocol are signed at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateInfo {
    pub count: usize,
    pub total_amount: BigUint,
    pub total_fees: BigUint,
}

/// Sums amounts and fees of a batch.
///
/// Returns `None` for fewer than two transactions or when any transaction
/// belongs to a different protocol than the first.
pub fn aggregate(transactions: &[ReviewableTransaction]) -> Option<AggregateInfo> {
    let (first, rest) = transactions.split_first()?;
    if rest.is_empty() || rest.iter().any(|tx| tx.protocol != first.protocol) {
        return None;
    }

    Some(AggregateInfo {
        count: transactions.len(),
        total_amount: transactions.iter().map(|tx| &tx.amount).sum(),
        total_fees: transactions.iter().map(|tx| &tx.fee).sum(),
    })
}

/// How the signing device is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerConnectionType {
    Usb,
    Ble,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConnection {
    #[serde(rename = "type")]
    pub connection_type: LedgerConnectionType,
    pub descriptor: String,
}

/// Unsigned data passed to the device, exactly as handed off by the
/// request workflow.
pub type UnsignedPayload = InteractionData;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The user declined on the device.
    #[error("Rejected")]
    Rejected,
    #[error("{0}")]
    Device(String),
    #[error("unknown signer failure")]
    Unknown,
}

/// Hardware signer. Connection management and signing primitives live
/// behind this trait.
#[async_trait]
pub trait LedgerSigner: Send + Sync {
    async fn sign_transaction(
        &self,
        protocol: ProtocolSymbol,
        unsigned: &UnsignedPayload,
        connection: Option<&LedgerConnection>,
    ) -> Result<String, SignerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Device(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unknown ledger error")]
    Unknown,
}

impl LedgerError {
    /// Text for the error alert. Unknown failures yield the translation key
    /// of the generic message.
    pub fn alert_message(&self) -> String {
        match self {
            Self::Device(message) => message.clone(),
            Self::Transport(err) => err.to_string(),
            Self::Unknown => UNKNOWN_ERROR_ALERT_KEY.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// The signed transaction was handed to the confirmation surface.
    Signed(MessageDefinition),
    /// The user declined on the device; nothing is shown.
    Rejected,
}

/// One hardware signing attempt for a handed-off interaction.
#[derive(Debug, Clone)]
pub struct LedgerSignSession {
    wallet: WalletRef,
    transactions: Vec<ReviewableTransaction>,
    unsigned: UnsignedPayload,
    generated_id: CorrelationId,
    aggregate: Option<AggregateInfo>,
    connection: Option<LedgerConnection>,
}

impl LedgerSignSession {
    pub fn from_interaction(info: InteractionInfo) -> Self {
        let aggregate = aggregate(&info.transactions);
        Self {
            wallet: info.wallet,
            transactions: info.transactions,
            unsigned: info.data,
            generated_id: info.generated_id,
            aggregate,
            connection: None,
        }
    }

    pub fn with_connection(mut self, connection: LedgerConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn wallet(&self) -> &WalletRef {
        &self.wallet
    }

    pub fn transactions(&self) -> &[ReviewableTransaction] {
        &self.transactions
    }

    pub fn aggregate(&self) -> Option<&AggregateInfo> {
        self.aggregate.as_ref()
    }

    /// Correlation id of the pending request this session answers.
    pub fn generated_id(&self) -> &CorrelationId {
        &self.generated_id
    }

    /// Signs on the device and hands the result to transaction confirmation.
    pub async fn sign(
        &self,
        signer: &dyn LedgerSigner,
        emitter: &ResponseEmitter,
    ) -> Result<SignOutcome, LedgerError> {
        let protocol = self.wallet.protocol;
        debug!(
            "ledger signing: protocol={protocol}, correlation_id={}, transactions={}",
            self.generated_id,
            self.transactions.len()
        );

        let signed = match signer
            .sign_transaction(protocol, &self.unsigned, self.connection.as_ref())
            .await
        {
            Ok(signed) => signed,
            Err(SignerError::Rejected) => {
                info!("ledger signing rejected on device: {}", self.generated_id);
                return Ok(SignOutcome::Rejected);
            }
            Err(SignerError::Device(message)) => {
                warn!("ledger signing failed: {message}");
                return Err(LedgerError::Device(message));
            }
            Err(SignerError::Unknown) => {
                warn!("ledger signing failed without detail");
                return Err(LedgerError::Unknown);
            }
        };

        let message = MessageDefinition {
            id: None,
            kind: MessageKind::MessageSignResponse,
            protocol,
            payload: SignedTransactionPayload {
                account_identifier: self.wallet.account_identifier().to_owned(),
                transaction: signed,
            },
        };
        emitter
            .emit(Outbound::Handoff(Handoff::Transaction(TransactionInfo {
                message_definition_objects: vec![message.clone()],
            })))
            .await?;
        info!("ledger signing complete: {}", self.generated_id);
        Ok(SignOutcome::Signed(message))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use beacon_connect::request::error::TransportResult;
    use beacon_connect::request::types::{BeaconResponse, ForgedOperation, HandoffKey};
    use beacon_connect::request::{BeaconTransport, InteractionChannel};
    use parking_lot::Mutex;

    use super::*;

    fn transaction(protocol: ProtocolSymbol, amount: u64, fee: u64) -> ReviewableTransaction {
        ReviewableTransaction {
            from: vec!["tz1from".into()],
            to: vec!["tz1to".into()],
            amount: BigUint::from(amount),
            fee: BigUint::from(fee),
            protocol,
            network: None,
            is_inbound: false,
            details: None,
        }
    }

    #[test]
    fn aggregate_sums_same_protocol_batch() {
        let info = aggregate(&[
            transaction(ProtocolSymbol::Xtz, 10, 1),
            transaction(ProtocolSymbol::Xtz, 5, 1),
        ])
        .expect("two tezos transactions aggregate");
        assert_eq!(
            info,
            AggregateInfo {
                count: 2,
                total_amount: BigUint::from(15u32),
                total_fees: BigUint::from(2u32),
            }
        );
    }

    #[test]
    fn aggregate_requires_more_than_one_transaction() {
        assert_eq!(aggregate(&[]), None);
        assert_eq!(aggregate(&[transaction(ProtocolSymbol::Xtz, 10, 1)]), None);
    }

    #[test]
    fn aggregate_rejects_mixed_protocols() {
        assert_eq!(
            aggregate(&[
                transaction(ProtocolSymbol::Xtz, 10, 1),
                transaction(ProtocolSymbol::Xtz, 3, 1),
                transaction(ProtocolSymbol::Eth, 5, 1),
            ]),
            None
        );
    }

    #[test]
    fn aggregate_does_not_overflow_u64() {
        let info = aggregate(&[
            transaction(ProtocolSymbol::Eth, u64::MAX, u64::MAX),
            transaction(ProtocolSymbol::Eth, u64::MAX, 1),
        ])
        .unwrap();
        let expected = BigUint::from(u64::MAX) * 2u32;
        assert_eq!(info.total_amount, expected);
        assert_eq!(info.total_fees, BigUint::from(u64::MAX) + 1u32);
    }

    #[test]
    fn alert_message_falls_back_to_generic_key() {
        assert_eq!(
            LedgerError::Device("Device locked".into()).alert_message(),
            "Device locked"
        );
        assert_eq!(LedgerError::Unknown.alert_message(), UNKNOWN_ERROR_ALERT_KEY);
    }

    #[test]
    fn connection_serializes_type_tag() {
        let connection = LedgerConnection {
            connection_type: LedgerConnectionType::Usb,
            descriptor: "hid:0001".into(),
        };
        let json = serde_json::to_value(&connection).unwrap();
        assert_eq!(json["type"], "usb");
        assert_eq!(json["descriptor"], "hid:0001");
    }

    struct ScriptedSigner {
        result: Result<String, SignerError>,
        calls: Mutex<Vec<(ProtocolSymbol, UnsignedPayload, Option<LedgerConnection>)>>,
    }

    impl ScriptedSigner {
        fn new(result: Result<String, SignerError>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerSigner for ScriptedSigner {
        async fn sign_transaction(
            &self,
            protocol: ProtocolSymbol,
            unsigned: &UnsignedPayload,
            connection: Option<&LedgerConnection>,
        ) -> Result<String, SignerError> {
            self.calls
                .lock()
                .push((protocol, unsigned.clone(), connection.cloned()));
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        values: Mutex<Vec<(HandoffKey, Handoff)>>,
        routes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InteractionChannel for RecordingChannel {
        fn put(&self, key: HandoffKey, value: Handoff) {
            self.values.lock().push((key, value));
        }

        async fn navigate(&self, route: &str) -> TransportResult<()> {
            self.routes.lock().push(route.to_owned());
            Ok(())
        }
    }

    struct SilentTransport;

    #[async_trait]
    impl BeaconTransport for SilentTransport {
        async fn respond(&self, _response: BeaconResponse) -> TransportResult<()> {
            Ok(())
        }

        async fn send_aborted(&self, _request_id: &str) -> TransportResult<()> {
            Ok(())
        }
    }

    fn session() -> LedgerSignSession {
        LedgerSignSession::from_interaction(InteractionInfo {
            wallet: WalletRef {
                protocol: ProtocolSymbol::Xtz,
                public_key: "edpkuLedgerKey9a8b7c".into(),
                address: "tz1ledger".into(),
            },
            transactions: vec![
                transaction(ProtocolSymbol::Xtz, 10, 1),
                transaction(ProtocolSymbol::Xtz, 5, 1),
            ],
            data: InteractionData::Forged(ForgedOperation("03ffee".into())),
            generated_id: CorrelationId::new("a1B2c3D4e5"),
            kind: MessageKind::TransactionSignRequest,
        })
    }

    fn emitter(channel: &Arc<RecordingChannel>) -> ResponseEmitter {
        ResponseEmitter::new(Arc::new(SilentTransport), channel.clone())
    }

    #[tokio::test]
    async fn signed_transaction_is_handed_to_confirmation() {
        let channel = Arc::new(RecordingChannel::default());
        let signer = ScriptedSigner::new(Ok("signed-bytes".into()));
        let connection = LedgerConnection {
            connection_type: LedgerConnectionType::Ble,
            descriptor: "ledger-nano-x".into(),
        };
        let session = session().with_connection(connection.clone());
        assert_eq!(session.aggregate().map(|info| info.count), Some(2));

        let outcome = session.sign(&signer, &emitter(&channel)).await.unwrap();

        let expected = MessageDefinition {
            id: None,
            kind: MessageKind::MessageSignResponse,
            protocol: ProtocolSymbol::Xtz,
            payload: SignedTransactionPayload {
                account_identifier: "9a8b7c".into(),
                transaction: "signed-bytes".into(),
            },
        };
        assert_eq!(outcome, SignOutcome::Signed(expected.clone()));

        let calls = signer.calls.lock().clone();
        assert_eq!(
            calls,
            vec![(
                ProtocolSymbol::Xtz,
                InteractionData::Forged(ForgedOperation("03ffee".into())),
                Some(connection)
            )]
        );
        assert_eq!(
            channel.values.lock().clone(),
            vec![(
                HandoffKey::Transaction,
                Handoff::Transaction(TransactionInfo {
                    message_definition_objects: vec![expected],
                })
            )]
        );
        assert_eq!(
            channel.routes.lock().clone(),
            vec!["/transaction-confirm/transaction".to_owned()]
        );
    }

    #[tokio::test]
    async fn device_rejection_is_silent() {
        let channel = Arc::new(RecordingChannel::default());
        let signer = ScriptedSigner::new(Err(SignerError::Rejected));

        let outcome = session().sign(&signer, &emitter(&channel)).await.unwrap();

        assert_eq!(outcome, SignOutcome::Rejected);
        assert!(channel.values.lock().is_empty());
        assert!(channel.routes.lock().is_empty());
    }

    #[tokio::test]
    async fn device_failures_become_alerts() {
        let channel = Arc::new(RecordingChannel::default());

        let signer = ScriptedSigner::new(Err(SignerError::Device("App not open".into())));
        let err = session()
            .sign(&signer, &emitter(&channel))
            .await
            .expect_err("device error");
        assert_eq!(err.alert_message(), "App not open");

        let signer = ScriptedSigner::new(Err(SignerError::Unknown));
        let err = session()
            .sign(&signer, &emitter(&channel))
            .await
            .expect_err("unknown error");
        assert_eq!(err, LedgerError::Unknown);
        assert_eq!(err.alert_message(), UNKNOWN_ERROR_ALERT_KEY);
        assert!(channel.values.lock().is_empty());
    }
}
