//! Serde adapter storing a `U256` as a 64-digit big-endian hex string.
//!
//! Use with `#[serde(with = "rrbtc_math::serde_hex")]`.

use crate::{u256_from_hex, u256_to_hex, U256};
use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&u256_to_hex(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    u256_from_hex(&s).map_err(D::Error::custom)
}
