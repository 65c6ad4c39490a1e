pub mod error;
pub mod ledger;

pub use error::{WalletError, WalletErrorKind, WalletResult};
pub use ledger::{
    AggregateInfo, LedgerConnection, LedgerError, LedgerSignSession, LedgerSigner, SignOutcome,
    SignerError, aggregate,
};
