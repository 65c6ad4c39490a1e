//! Request correlation and signing orchestration for wallet-interaction
//! requests (permission grants, payload signatures, operations, broadcasts).

pub mod request;

pub use vault_chain::{Network, NetworkType, ProtocolSymbol};
