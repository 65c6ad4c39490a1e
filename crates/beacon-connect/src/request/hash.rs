use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tracing::debug;

type Blake2b256 = Blake2b<U32>;

/// Base58 blake2b-256 digest of a hex payload, as shown on a Ledger screen.
///
/// Best effort: the hash is informational only, so any failure yields `None`
/// and never blocks the request.
pub fn ledger_hash(payload_hex: &str) -> Option<String> {
    match hex::decode(payload_hex) {
        Ok(bytes) => {
            let digest = Blake2b256::digest(&bytes);
            Some(bs58::encode(digest).into_string())
        }
        Err(err) => {
            debug!("ledger hash skipped: {err}");
            None
        }
    }
}
