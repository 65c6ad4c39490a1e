use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use vault_chain::Network;

use super::{
    collaborators::{
        BeaconTransport, InteractionChannel, InteractionSurface, ProtocolFactory, ProtocolService,
        WalletDirectory,
    },
    config::EngineConfig,
    correlation::{CorrelationId, CorrelationIds},
    emitter::{Outbound, ResponseEmitter},
    error::{RequestError, Result},
    hash::ledger_hash,
    pending::{PendingRequest, PendingRequests, ResolvedContext},
    resolver::{WalletResolver, resolve_protocol},
    state::{Phase, ScopeInput, scope_inputs, selected_scopes},
    types::{
        BeaconRequest, BeaconResponse, BroadcastRequest, ForgedOperation, Handoff,
        InteractionData, InteractionInfo, MessageDefinition, MessageKind, OperationRequest,
        PermissionRequest, PermissionResponse, PermissionScope, RequestKind,
        ReviewableTransaction, SignPayloadRequest, SignedTransactionPayload, TransactionInfo,
        WalletRef,
    },
    validator,
};

const CORRELATION_ID_ATTEMPTS: usize = 8;

/// Services the workflow calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub protocols: Arc<dyn ProtocolFactory>,
    pub wallets: Arc<dyn WalletDirectory>,
    pub transport: Arc<dyn BeaconTransport>,
    pub channel: Arc<dyn InteractionChannel>,
    pub surface: Arc<dyn InteractionSurface>,
}

/// Deferred action bound to a handled request. Taken out of the interaction
/// on confirm, so it runs at most once.
pub enum ResponseHandler {
    Permission {
        request_id: String,
        public_key: String,
        network: Network,
    },
    SignPayload {
        wallet: WalletRef,
        request: SignPayloadRequest,
        generated_id: CorrelationId,
    },
    Operation {
        wallet: WalletRef,
        protocol: Arc<dyn ProtocolService>,
        forged: ForgedOperation,
        generated_id: CorrelationId,
    },
    Broadcast {
        message: MessageDefinition,
    },
}

impl fmt::Debug for ResponseHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission { request_id, .. } => f
                .debug_struct("Permission")
                .field("request_id", request_id)
                .finish_non_exhaustive(),
            Self::SignPayload { generated_id, .. } => f
                .debug_struct("SignPayload")
                .field("generated_id", generated_id)
                .finish_non_exhaustive(),
            Self::Operation { generated_id, .. } => f
                .debug_struct("Operation")
                .field("generated_id", generated_id)
                .finish_non_exhaustive(),
            Self::Broadcast { message } => f
                .debug_struct("Broadcast")
                .field("message_id", &message.id)
                .finish_non_exhaustive(),
        }
    }
}

impl ResponseHandler {
    async fn into_outbound(self, scopes: &[ScopeInput]) -> Result<Outbound> {
        match self {
            Self::Permission {
                request_id,
                public_key,
                network,
            } => Ok(Outbound::Response(BeaconResponse::Permission(
                PermissionResponse {
                    id: request_id,
                    public_key,
                    network,
                    scopes: selected_scopes(scopes),
                },
            ))),
            Self::SignPayload {
                wallet,
                request,
                generated_id,
            } => Ok(Outbound::Handoff(Handoff::Interaction(InteractionInfo {
                wallet,
                transactions: Vec::new(),
                data: InteractionData::SignPayload(request),
                generated_id,
                kind: MessageKind::MessageSignRequest,
            }))),
            Self::Operation {
                wallet,
                protocol,
                forged,
                generated_id,
            } => {
                let transactions = protocol
                    .decode_forged(&wallet.public_key, &forged)
                    .await
                    .map_err(RequestError::Preparation)?;
                Ok(Outbound::Handoff(Handoff::Interaction(InteractionInfo {
                    wallet,
                    transactions,
                    data: InteractionData::Forged(forged),
                    generated_id,
                    kind: MessageKind::TransactionSignRequest,
                })))
            }
            Self::Broadcast { message } => Ok(Outbound::Handoff(Handoff::Transaction(
                TransactionInfo {
                    message_definition_objects: vec![message],
                },
            ))),
        }
    }
}

/// A handled request waiting for the user's decision.
#[derive(Debug)]
pub struct Interaction {
    request: BeaconRequest,
    phase: Phase,
    context: ResolvedContext,
    correlation_id: Option<CorrelationId>,
    scopes: Vec<ScopeInput>,
    transactions: Vec<ReviewableTransaction>,
    ledger_hash: Option<String>,
    handler: Option<ResponseHandler>,
    /// Handler output whose delivery failed; re-sent by the next confirm.
    staged: Option<Outbound>,
}

impl Interaction {
    pub fn request(&self) -> &BeaconRequest {
        &self.request
    }

    pub fn kind(&self) -> RequestKind {
        self.request.kind()
    }

    pub fn title_key(&self) -> &'static str {
        self.kind().title_key()
    }

    pub fn requester_name(&self) -> &str {
        self.request.requester_name()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &ResolvedContext {
        &self.context
    }

    pub fn network(&self) -> Option<&Network> {
        self.context.network.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.context
            .wallet
            .as_ref()
            .map(|wallet| wallet.address.as_str())
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    pub fn scopes(&self) -> &[ScopeInput] {
        &self.scopes
    }

    /// Toggles a permission scope; returns false if the scope is not offered.
    pub fn set_scope(&mut self, scope: PermissionScope, checked: bool) -> bool {
        match self.scopes.iter_mut().find(|input| input.scope == scope) {
            Some(input) => {
                input.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn transactions(&self) -> &[ReviewableTransaction] {
        &self.transactions
    }

    pub fn ledger_hash(&self) -> Option<&str> {
        self.ledger_hash.as_deref()
    }

    fn closed(&self, action: &'static str) -> RequestError {
        RequestError::Closed {
            action,
            phase: self.phase,
        }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(self.phase.can_advance_to(next), "{:?} -> {next:?}", self.phase);
        debug!("interaction {}: {:?} -> {next:?}", self.request.id(), self.phase);
        self.phase = next;
    }
}

struct Prepared {
    context: ResolvedContext,
    correlation_id: Option<CorrelationId>,
    scopes: Vec<ScopeInput>,
    transactions: Vec<ReviewableTransaction>,
    ledger_hash: Option<String>,
    handler: ResponseHandler,
}

impl Prepared {
    fn new(context: ResolvedContext, handler: ResponseHandler) -> Self {
        Self {
            context,
            correlation_id: None,
            scopes: Vec::new(),
            transactions: Vec::new(),
            ledger_hash: None,
            handler,
        }
    }
}

/// Classifies incoming requests, binds their response handlers and drives
/// confirmation or cancellation.
pub struct RequestWorkflow {
    config: EngineConfig,
    wallets: WalletResolver,
    protocols: Arc<dyn ProtocolFactory>,
    surface: Arc<dyn InteractionSurface>,
    emitter: ResponseEmitter,
    pending: Arc<PendingRequests>,
    ids: CorrelationIds,
}

impl RequestWorkflow {
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        let pending = Arc::new(PendingRequests::with_ttl(config.pending_ttl()));
        Self::with_pending(config, collaborators, pending)
    }

    /// Builds a workflow around an existing pending store, e.g. one shared
    /// with the surface that completes signing.
    pub fn with_pending(
        config: EngineConfig,
        collaborators: Collaborators,
        pending: Arc<PendingRequests>,
    ) -> Self {
        Self {
            ids: CorrelationIds::new(config.correlation_id_length),
            wallets: WalletResolver::new(collaborators.wallets),
            protocols: collaborators.protocols,
            surface: collaborators.surface,
            emitter: ResponseEmitter::new(collaborators.transport, collaborators.channel),
            pending,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }

    pub fn emitter(&self) -> &ResponseEmitter {
        &self.emitter
    }

    /// Called when the external signer returns control for `id`.
    pub fn take_pending(&self, id: &CorrelationId) -> Option<PendingRequest> {
        self.pending.take(id)
    }

    pub fn evict_expired(&self) -> Vec<CorrelationId> {
        self.pending.evict_expired()
    }

    /// Handles `request` up to the point where it awaits the user.
    ///
    /// Failures are shown on the interaction surface, which is then
    /// dismissed, and returned to the caller.
    pub async fn receive(&self, request: BeaconRequest) -> Result<Interaction> {
        let kind = request.kind();
        info!(
            "request received: id={}, kind={kind:?}, requester={}",
            request.id(),
            request.requester_name()
        );

        let prepared = match &request {
            BeaconRequest::Permission(inner) => self.permission_request(inner).await,
            BeaconRequest::SignPayload(inner) => self.sign_request(inner).await,
            BeaconRequest::Operation(inner) => self.operation_request(inner).await,
            BeaconRequest::Broadcast(inner) => self.broadcast_request(inner).await,
        };

        match prepared {
            Ok(prepared) => {
                let mut interaction = Interaction {
                    request,
                    phase: Phase::Received,
                    context: prepared.context,
                    correlation_id: prepared.correlation_id,
                    scopes: prepared.scopes,
                    transactions: prepared.transactions,
                    ledger_hash: prepared.ledger_hash,
                    handler: Some(prepared.handler),
                    staged: None,
                };
                interaction.advance(Phase::Handling(kind));
                interaction.advance(Phase::Bound);
                Ok(interaction)
            }
            Err(err) => {
                warn!(
                    "request {} failed: code={}, error={err}",
                    request.id(),
                    err.code()
                );
                self.display_error(&err).await;
                Err(err)
            }
        }
    }

    /// Runs the bound response handler once and delivers its result, then
    /// dismisses the interaction.
    ///
    /// When delivery fails the result stays staged on the interaction and the
    /// surface stays open; calling `confirm` again re-sends it without running
    /// the handler a second time.
    pub async fn confirm(&self, interaction: &mut Interaction) -> Result<()> {
        if !matches!(interaction.phase, Phase::Bound | Phase::Confirmed) {
            return Err(interaction.closed("confirm"));
        }
        let request_id = interaction.request.id().to_owned();

        let outbound = match interaction.staged.take() {
            Some(outbound) => {
                debug!("request {request_id}: retrying delivery");
                outbound
            }
            None => {
                let Some(handler) = interaction.handler.take() else {
                    return Err(interaction.closed("confirm"));
                };
                interaction.advance(Phase::Confirmed);
                match handler.into_outbound(&interaction.scopes).await {
                    Ok(outbound) => outbound,
                    Err(err) => {
                        warn!(
                            "request {request_id} failed on confirm: code={}, error={err}",
                            err.code()
                        );
                        interaction.advance(Phase::Errored);
                        if let Some(id) = &interaction.correlation_id {
                            self.pending.take(id);
                        }
                        self.display_error(&err).await;
                        interaction.advance(Phase::Dismissed);
                        return Err(err);
                    }
                }
            }
        };

        if let Err(err) = self.emitter.emit(outbound.clone()).await {
            warn!("request {request_id} not delivered, confirm may be retried: {err}");
            interaction.staged = Some(outbound);
            return Err(err.into());
        }
        info!("request {request_id} confirmed");
        interaction.advance(Phase::Dismissed);
        self.dismiss().await;
        Ok(())
    }

    /// Discards the bound handler and answers the peer with an abort keyed by
    /// the original request id.
    ///
    /// The pending entry is released only after the abort is delivered, so a
    /// failed cancel can be retried. A confirmation that was never delivered
    /// can still be cancelled.
    pub async fn cancel(&self, interaction: &mut Interaction) -> Result<()> {
        match interaction.phase {
            Phase::Bound | Phase::Confirmed => {
                interaction.handler = None;
                interaction.staged = None;
                interaction.advance(Phase::Cancelled);
            }
            Phase::Cancelled => debug!("request {}: retrying abort", interaction.request.id()),
            _ => return Err(interaction.closed("cancel")),
        }

        self.emitter.emit_abort(interaction.request.id()).await?;
        if let Some(id) = &interaction.correlation_id {
            self.pending.take(id);
        }
        info!("request {} cancelled", interaction.request.id());
        interaction.advance(Phase::Dismissed);
        self.dismiss().await;
        Ok(())
    }

    async fn permission_request(&self, request: &PermissionRequest) -> Result<Prepared> {
        let protocol = resolve_protocol(self.protocols.as_ref(), &request.network).await?;
        let wallet = self.wallets.resolve(self.config.chain).await?;

        let handler = ResponseHandler::Permission {
            request_id: request.id.clone(),
            public_key: wallet.public_key.clone(),
            network: request.network.clone(),
        };
        let context = ResolvedContext {
            network: Some(protocol.network()),
            wallet: Some(wallet),
            protocol,
        };

        let mut prepared = Prepared::new(context, handler);
        prepared.scopes = scope_inputs(&request.scopes);
        Ok(prepared)
    }

    async fn sign_request(&self, request: &SignPayloadRequest) -> Result<Prepared> {
        let protocol = self.protocols.default_protocol();
        let wallet = self.wallets.resolve(self.config.chain).await?;

        validator::validate(request.signing_type, &request.payload)?;
        let hash = ledger_hash(&request.payload);

        let context = ResolvedContext {
            wallet: Some(wallet.clone()),
            protocol,
            network: None,
        };
        let generated_id =
            self.register_pending(BeaconRequest::SignPayload(request.clone()), &context)?;

        let mut cloned = request.clone();
        cloned.id = generated_id.to_string();

        let mut prepared = Prepared::new(
            context,
            ResponseHandler::SignPayload {
                wallet,
                request: cloned,
                generated_id: generated_id.clone(),
            },
        );
        prepared.correlation_id = Some(generated_id);
        prepared.ledger_hash = hash;
        Ok(prepared)
    }

    async fn operation_request(&self, request: &OperationRequest) -> Result<Prepared> {
        let wallet = self.wallets.resolve(self.config.chain).await?;
        let protocol = resolve_protocol(self.protocols.as_ref(), &request.network).await?;

        let wrapped = protocol
            .prepare_operation(&wallet.public_key, &request.operation_details)
            .await
            .map_err(RequestError::Preparation)?;
        let forged = protocol
            .forge(&wrapped)
            .await
            .map_err(RequestError::Preparation)?;
        let transactions = protocol
            .decode_forged(&wallet.public_key, &forged)
            .await
            .map_err(RequestError::Preparation)?;
        debug!(
            "operation {} prepared: {} transaction(s)",
            request.id,
            transactions.len()
        );

        let context = ResolvedContext {
            wallet: Some(wallet.clone()),
            network: Some(protocol.network()),
            protocol: protocol.clone(),
        };
        let generated_id =
            self.register_pending(BeaconRequest::Operation(request.clone()), &context)?;

        let mut prepared = Prepared::new(
            context,
            ResponseHandler::Operation {
                wallet,
                protocol,
                forged,
                generated_id: generated_id.clone(),
            },
        );
        prepared.correlation_id = Some(generated_id);
        prepared.transactions = transactions;
        Ok(prepared)
    }

    async fn broadcast_request(&self, request: &BroadcastRequest) -> Result<Prepared> {
        let protocol = resolve_protocol(self.protocols.as_ref(), &request.network).await?;
        let transactions = protocol
            .decode_signed(&request.signed_transaction)
            .await
            .map_err(RequestError::Preparation)?;

        let context = ResolvedContext {
            wallet: None,
            network: Some(protocol.network()),
            protocol: protocol.clone(),
        };
        let generated_id =
            self.register_pending(BeaconRequest::Broadcast(request.clone()), &context)?;

        let message = MessageDefinition {
            id: Some(generated_id.clone()),
            kind: MessageKind::MessageSignResponse,
            protocol: protocol.identifier(),
            payload: SignedTransactionPayload {
                account_identifier: String::new(),
                transaction: request.signed_transaction.clone(),
            },
        };

        let mut prepared = Prepared::new(context, ResponseHandler::Broadcast { message });
        prepared.correlation_id = Some(generated_id);
        prepared.transactions = transactions;
        Ok(prepared)
    }

    /// Stores `request` under a fresh correlation id, drawing again when the
    /// store already holds the drawn id.
    fn register_pending(
        &self,
        request: BeaconRequest,
        context: &ResolvedContext,
    ) -> Result<CorrelationId> {
        let mut attempt = 1;
        loop {
            let id = self.ids.generate();
            match self.pending.put(id.clone(), request.clone(), context.clone()) {
                Ok(_) => return Ok(id),
                Err(err) if attempt < CORRELATION_ID_ATTEMPTS => {
                    debug!("{err}; drawing another correlation id");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn display_error(&self, err: &RequestError) {
        if let Err(display_err) = self.surface.show_error(&err.report()).await {
            warn!("error surface unavailable: {display_err}");
        }
        tokio::time::sleep(self.config.error_dismiss_delay()).await;
        self.dismiss().await;
    }

    async fn dismiss(&self) {
        if let Err(err) = self.surface.dismiss().await {
            warn!("dismiss failed: {err}");
        }
    }
}
