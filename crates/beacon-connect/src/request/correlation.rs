use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_CORRELATION_ID_LENGTH: usize = 10;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque token linking a pending request to its eventual completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fixed-length alphanumeric id source backed by the OS RNG.
///
/// Falls back to a salted monotonic counter if the OS RNG is unavailable, so
/// `generate` never fails.
#[derive(Debug)]
pub struct CorrelationIds {
    length: usize,
    counter: AtomicU64,
    salt: u64,
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new(DEFAULT_CORRELATION_ID_LENGTH)
    }
}

impl CorrelationIds {
    pub fn new(length: usize) -> Self {
        let salt = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self {
            length: length.max(1),
            counter: AtomicU64::new(0),
            salt,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> CorrelationId {
        let mut bytes = vec![0u8; self.length];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => CorrelationId(bytes.iter().map(|b| alphabet_char(u64::from(*b))).collect()),
            Err(err) => {
                warn!("os rng unavailable, using counter-based correlation id: {err}");
                self.generate_from_counter()
            }
        }
    }

    fn generate_from_counter(&self) -> CorrelationId {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        // xor with a fixed salt keeps distinct counts distinct
        let mut value = count ^ self.salt.rotate_left(17);
        let mut chars = vec![ALPHABET[0] as char; self.length];
        for slot in chars.iter_mut().rev() {
            *slot = alphabet_char(value);
            value /= ALPHABET.len() as u64;
        }
        CorrelationId(chars.into_iter().collect())
    }
}

fn alphabet_char(value: u64) -> char {
    ALPHABET[(value % ALPHABET.len() as u64) as usize] as char
}
