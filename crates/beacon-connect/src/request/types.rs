use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use vault_chain::{Network, ProtocolSymbol};

use super::correlation::CorrelationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    Sign,
    OperationRequest,
    Threshold,
}

impl PermissionScope {
    /// Display order of the scope selection.
    pub const ALL: [Self; 3] = [Self::Sign, Self::OperationRequest, Self::Threshold];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sign => "sign",
            Self::OperationRequest => "operation_request",
            Self::Threshold => "threshold",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Self::Sign => "beacon-request.permission.sign-transactions",
            Self::OperationRequest => "beacon-request.permission.operation-request",
            Self::Threshold => "beacon-request.permission.threshold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningType {
    Raw,
    Operation,
    Micheline,
}

impl SigningType {
    /// Hex prefix a payload must carry for this signing type, if any.
    pub fn required_prefix(self) -> Option<&'static str> {
        match self {
            Self::Operation => Some("03"),
            Self::Micheline => Some("05"),
            Self::Raw => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::Operation => "OPERATION",
            Self::Micheline => "MICHELINE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    pub sender_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Protocol-specific operation intent; interpreted only by the protocol service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationIntent(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    pub id: String,
    pub app_metadata: AppMetadata,
    pub network: Network,
    pub scopes: Vec<PermissionScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPayloadRequest {
    pub id: String,
    pub app_metadata: AppMetadata,
    pub signing_type: SigningType,
    pub payload: String,
    #[serde(default)]
    pub source_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub id: String,
    pub app_metadata: AppMetadata,
    pub network: Network,
    #[serde(default)]
    pub source_address: String,
    pub operation_details: Vec<OperationIntent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub id: String,
    pub app_metadata: AppMetadata,
    pub network: Network,
    pub signed_transaction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Permission,
    SignPayload,
    Operation,
    Broadcast,
}

impl RequestKind {
    pub fn title_key(self) -> &'static str {
        match self {
            Self::Permission => "beacon-request.title.permission-request",
            Self::SignPayload => "beacon-request.title.sign-payload-request",
            Self::Operation => "beacon-request.title.operation-request",
            Self::Broadcast => "beacon-request.title.broadcast-request",
        }
    }
}

/// Incoming wallet-interaction request, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BeaconRequest {
    #[serde(rename = "permission_request")]
    Permission(PermissionRequest),
    #[serde(rename = "sign_payload_request")]
    SignPayload(SignPayloadRequest),
    #[serde(rename = "operation_request")]
    Operation(OperationRequest),
    #[serde(rename = "broadcast_request")]
    Broadcast(BroadcastRequest),
}

impl BeaconRequest {
    pub fn id(&self) -> &str {
        match self {
            Self::Permission(request) => &request.id,
            Self::SignPayload(request) => &request.id,
            Self::Operation(request) => &request.id,
            Self::Broadcast(request) => &request.id,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Permission(_) => RequestKind::Permission,
            Self::SignPayload(_) => RequestKind::SignPayload,
            Self::Operation(_) => RequestKind::Operation,
            Self::Broadcast(_) => RequestKind::Broadcast,
        }
    }

    /// Target network; sign-payload requests are network-agnostic.
    pub fn network(&self) -> Option<&Network> {
        match self {
            Self::Permission(request) => Some(&request.network),
            Self::SignPayload(_) => None,
            Self::Operation(request) => Some(&request.network),
            Self::Broadcast(request) => Some(&request.network),
        }
    }

    pub fn app_metadata(&self) -> &AppMetadata {
        match self {
            Self::Permission(request) => &request.app_metadata,
            Self::SignPayload(request) => &request.app_metadata,
            Self::Operation(request) => &request.app_metadata,
            Self::Broadcast(request) => &request.app_metadata,
        }
    }

    pub fn requester_name(&self) -> &str {
        &self.app_metadata().name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRef {
    #[serde(rename = "protocolIdentifier")]
    pub protocol: ProtocolSymbol,
    pub public_key: String,
    pub address: String,
}

impl WalletRef {
    /// Short account tag used in signed-transaction messages.
    pub fn account_identifier(&self) -> &str {
        let key = self.public_key.as_str();
        let start = key
            .char_indices()
            .rev()
            .nth(5)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &key[start..]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WrappedOperation {
    pub branch: String,
    pub contents: Vec<serde_json::Value>,
}

/// Forged, unsigned operation bytes (hex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForgedOperation(pub String);

/// Human-reviewable view of a decoded transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewableTransaction {
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(with = "vault_chain::amount")]
    pub amount: BigUint,
    #[serde(with = "vault_chain::amount")]
    pub fee: BigUint,
    #[serde(rename = "protocolIdentifier")]
    pub protocol: ProtocolSymbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(default)]
    pub is_inbound: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: String,
    pub public_key: String,
    pub network: Network,
    pub scopes: Vec<PermissionScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BeaconResponse {
    #[serde(rename = "permission_response")]
    Permission(PermissionResponse),
}

impl BeaconResponse {
    pub fn id(&self) -> &str {
        match self {
            Self::Permission(response) => &response.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    MessageSignRequest,
    TransactionSignRequest,
    MessageSignResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransactionPayload {
    pub account_identifier: String,
    pub transaction: String,
}

/// Message relayed to the paired device or the broadcasting surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub protocol: ProtocolSymbol,
    pub payload: SignedTransactionPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffKey {
    Interaction,
    Transaction,
}

impl HandoffKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interaction => "interaction",
            Self::Transaction => "transaction",
        }
    }

    /// Route of the surface that consumes values stored under this key.
    pub fn route(self) -> String {
        match self {
            Self::Interaction => format!("/interaction-selection/{}", self.as_str()),
            Self::Transaction => format!("/transaction-confirm/{}", self.as_str()),
        }
    }
}

/// Unsigned data handed to the signing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InteractionData {
    SignPayload(SignPayloadRequest),
    Forged(ForgedOperation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionInfo {
    pub wallet: WalletRef,
    #[serde(default)]
    pub transactions: Vec<ReviewableTransaction>,
    pub data: InteractionData,
    pub generated_id: CorrelationId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub message_definition_objects: Vec<MessageDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Handoff {
    Interaction(InteractionInfo),
    Transaction(TransactionInfo),
}

impl Handoff {
    pub fn key(&self) -> HandoffKey {
        match self {
            Self::Interaction(_) => HandoffKey::Interaction,
            Self::Transaction(_) => HandoffKey::Transaction,
        }
    }
}
