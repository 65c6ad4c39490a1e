use anyhow::Result;
use beacon_connect::request::RequestError;
use beacon_connect::request::hash::ledger_hash;
use beacon_connect::request::validator::validate;
use tracing::debug;
use vault_wallet::WalletError;

use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs) -> Result<()> {
    debug!(
        "validate command: signing_type={:?}, payload_len={}",
        args.signing_type,
        args.payload.len()
    );
    validate(args.signing_type, &args.payload)
        .map_err(|err| WalletError::from(RequestError::from(err)))?;

    println!("Payload is valid for signing type {}.", args.signing_type.label());
    if let Some(hash) = ledger_hash(&args.payload) {
        println!("Ledger hash: {hash}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use beacon_connect::request::SigningType;

    use super::*;

    #[test]
    fn mismatched_prefix_is_reported() {
        let err = run(ValidateArgs {
            signing_type: SigningType::Micheline,
            payload: "03aa".into(),
        })
        .expect_err("03 is not micheline");
        let wallet_err = err.downcast_ref::<WalletError>().expect("wallet error");
        assert_eq!(wallet_err.code(), "VALIDATION");
        assert!(err.to_string().contains(r#"prefix "05""#));
    }

    #[test]
    fn raw_payload_passes() {
        run(ValidateArgs {
            signing_type: SigningType::Raw,
            payload: "deadbeef".into(),
        })
        .unwrap();
    }
}
