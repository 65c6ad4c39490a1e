use super::error::ValidationError;
use super::types::SigningType;

/// Checks that a sign-payload carries the type prefix its signing type requires.
///
/// `operation` payloads must start with `03`, `micheline` payloads with `05`;
/// any other signing type is passed through unchecked.
pub fn validate(signing_type: SigningType, payload: &str) -> Result<(), ValidationError> {
    let Some(expected) = signing_type.required_prefix() else {
        return Ok(());
    };

    if payload.starts_with(expected) {
        return Ok(());
    }

    Err(ValidationError::PrefixMismatch {
        mode: signing_type,
        expected,
        actual: payload.chars().take(expected.len()).collect(),
    })
}
