//! Base-unit amounts carried as decimal strings on the wire.

use num_bigint::BigUint;
use num_traits::Num;
use serde::{Deserialize, Deserializer, Serializer};

pub fn parse(value: &str) -> Result<BigUint, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::from_str_radix(trimmed, 10)
        .map_err(|err| format!("invalid base-unit amount '{trimmed}': {err}"))
}

pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}
