use std::sync::Arc;

use tracing::{debug, warn};

use super::collaborators::{BeaconTransport, InteractionChannel};
use super::error::TransportResult;
use super::types::{BeaconResponse, Handoff};

/// Result of a confirmed interaction, routed to its destination.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Answer sent back to the requesting peer.
    Response(BeaconResponse),
    /// Data handed to the next signing or broadcasting surface.
    Handoff(Handoff),
}

/// Forwards outbound messages to the transport collaborators.
///
/// Success means the message was queued. Failures are returned to the caller
/// and never retried here.
#[derive(Clone)]
pub struct ResponseEmitter {
    transport: Arc<dyn BeaconTransport>,
    channel: Arc<dyn InteractionChannel>,
}

impl ResponseEmitter {
    pub fn new(transport: Arc<dyn BeaconTransport>, channel: Arc<dyn InteractionChannel>) -> Self {
        Self { transport, channel }
    }

    pub async fn emit(&self, outbound: Outbound) -> TransportResult<()> {
        match outbound {
            Outbound::Response(response) => self.respond(response).await,
            Outbound::Handoff(handoff) => self.hand_off(handoff).await,
        }
    }

    pub async fn respond(&self, response: BeaconResponse) -> TransportResult<()> {
        debug!("emit response: id={}", response.id());
        self.transport.respond(response).await.inspect_err(|err| {
            warn!("response delivery failed: {err}");
        })
    }

    pub async fn hand_off(&self, handoff: Handoff) -> TransportResult<()> {
        let key = handoff.key();
        let route = key.route();
        debug!("emit hand-off: key={}, route={route}", key.as_str());
        self.channel.put(key, handoff);
        self.channel.navigate(&route).await.inspect_err(|err| {
            warn!("hand-off navigation failed: {err}");
        })
    }

    /// Tells the peer that `request_id` was aborted by the user.
    pub async fn emit_abort(&self, request_id: &str) -> TransportResult<()> {
        debug!("emit abort: request_id={request_id}");
        self.transport.send_aborted(request_id).await.inspect_err(|err| {
            warn!("abort delivery failed: {err}");
        })
    }
}
