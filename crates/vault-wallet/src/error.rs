use beacon_connect::request::{ErrorKind, RequestError};
use thiserror::Error;

use crate::ledger::LedgerError;

/// High-level category for a [`WalletError`].
///
/// Used to produce machine-readable error codes (see [`WalletError::code`]) and
/// to drive recovery logic in callers without string matching.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WalletErrorKind {
    /// The request payload was malformed.
    Validation,
    /// No wallet or protocol could serve the request.
    Resolution,
    /// The protocol refused to build the operation.
    Preparation,
    /// An outbound message or hand-off could not be delivered.
    Transport,
    /// The signing device reported an error.
    Device,
    Unknown,
}

/// Errors surfaced to hosts driving requests and ledger signing.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Host-provided input (request file, wallet list) could not be read.
    #[error("invalid {what}: {reason}")]
    Input { what: &'static str, reason: String },
}

pub type WalletResult<T> = std::result::Result<T, WalletError>;

impl WalletError {
    pub fn input(what: &'static str, reason: impl ToString) -> Self {
        Self::Input {
            what,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> WalletErrorKind {
        match self {
            Self::Request(error) => match error.kind() {
                ErrorKind::Validation => WalletErrorKind::Validation,
                ErrorKind::Resolution => WalletErrorKind::Resolution,
                ErrorKind::Preparation => WalletErrorKind::Preparation,
                ErrorKind::Transport => WalletErrorKind::Transport,
                ErrorKind::Unknown => WalletErrorKind::Unknown,
            },
            Self::Ledger(LedgerError::Device(_)) => WalletErrorKind::Device,
            Self::Ledger(LedgerError::Transport(_)) => WalletErrorKind::Transport,
            Self::Ledger(LedgerError::Unknown) => WalletErrorKind::Unknown,
            Self::Input { .. } => WalletErrorKind::Validation,
        }
    }

    /// Returns a short uppercase string code for this error (e.g. `"DEVICE"`).
    ///
    /// Suitable for use in JSON output or structured logs.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            WalletErrorKind::Validation => "VALIDATION",
            WalletErrorKind::Resolution => "RESOLUTION",
            WalletErrorKind::Preparation => "PREPARATION",
            WalletErrorKind::Transport => "TRANSPORT",
            WalletErrorKind::Device => "DEVICE",
            WalletErrorKind::Unknown => "UNKNOWN",
        }
    }
}
