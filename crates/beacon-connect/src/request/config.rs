use std::time::Duration;

use serde::{Deserialize, Serialize};
use vault_chain::ProtocolSymbol;

use super::correlation::DEFAULT_CORRELATION_ID_LENGTH;

pub const DEFAULT_ERROR_DISMISS_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Protocol whose first wallet answers every request.
    pub chain: ProtocolSymbol,
    pub correlation_id_length: usize,
    /// Pause between showing an error and dismissing the interaction.
    pub error_dismiss_delay_ms: u64,
    /// Unset keeps pending requests until they are taken.
    pub pending_ttl_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain: ProtocolSymbol::Xtz,
            correlation_id_length: DEFAULT_CORRELATION_ID_LENGTH,
            error_dismiss_delay_ms: DEFAULT_ERROR_DISMISS_DELAY_MS,
            pending_ttl_secs: None,
        }
    }
}

impl EngineConfig {
    pub fn error_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.error_dismiss_delay_ms)
    }

    pub fn pending_ttl(&self) -> Option<Duration> {
        self.pending_ttl_secs.map(Duration::from_secs)
    }
}
