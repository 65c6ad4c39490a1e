use thiserror::Error;
use vault_chain::{NetworkType, ProtocolSymbol};

use super::correlation::CorrelationId;
use super::state::Phase;
use super::types::SigningType;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "When using signing type \"{}\", the payload must start with prefix \"{expected}\" (found \"{actual}\")",
        .mode.label()
    )]
    PrefixMismatch {
        mode: SigningType,
        expected: &'static str,
        actual: String,
    },
}

/// Failure reported by a protocol service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),
    #[error("could not decode transaction: {0}")]
    Decode(String),
    #[error("protocol unavailable: {0}")]
    Unavailable(String),
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no wallet found for protocol {0}")]
    NoWallet(ProtocolSymbol),
    #[error("no protocol available for {network} network: {source}")]
    Protocol {
        network: &'static str,
        #[source]
        source: ProtocolError,
    },
}

impl ResolutionError {
    pub fn protocol(network: NetworkType, source: ProtocolError) -> Self {
        Self::Protocol {
            network: network.as_str(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
    #[error("hand-off to {route} failed: {reason}")]
    Navigation { route: String, reason: String },
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendingError {
    #[error("correlation id {0} is already pending")]
    Duplicate(CorrelationId),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Payload failed structural validation.
    Validation,
    /// No wallet or protocol matched the request.
    Resolution,
    /// The protocol rejected the requested operation.
    Preparation,
    /// The outbound message could not be queued.
    Transport,
    Unknown,
}

/// Stack-free description shown on the error surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("operation preparation failed: {0}")]
    Preparation(#[source] ProtocolError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Pending(#[from] PendingError),
    #[error("cannot {action} an interaction in phase {phase:?}")]
    Closed { action: &'static str, phase: Phase },
}

pub type Result<T> = std::result::Result<T, RequestError>;

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Preparation(_) => ErrorKind::Preparation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Pending(_) | Self::Closed { .. } => ErrorKind::Unknown,
        }
    }

    /// Short machine-readable code, e.g. for structured logs.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Resolution => "RESOLUTION",
            ErrorKind::Preparation => "PREPARATION",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }

    /// Only delivery failures may be retried, and only by the user.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn report(&self) -> ErrorReport {
        let (title, message) = match self.kind() {
            ErrorKind::Validation => ("Invalid payload", self.to_string()),
            ErrorKind::Resolution => ("No wallet available", self.to_string()),
            ErrorKind::Preparation => ("Operation rejected", self.to_string()),
            ErrorKind::Transport => ("Delivery failed", self.to_string()),
            ErrorKind::Unknown => ("Error", UNKNOWN_ERROR_MESSAGE.to_owned()),
        };
        ErrorReport {
            title: title.to_owned(),
            message,
        }
    }
}
