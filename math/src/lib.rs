//! 256-bit target arithmetic shared by the consensus crates.
//!
//! Targets are plain [`U256`] values. Block headers carry them in the
//! "compact" mantissa/exponent form handled by [`compact`].

pub mod compact;
pub mod serde_hex;

pub use compact::{compact_from_target, target_from_compact, DecodedTarget};
pub use primitive_types::{U256, U512};

use thiserror::Error;

/// Errors produced while parsing textual 256-bit values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("invalid hex digit in 256-bit value: {0}")]
    InvalidHex(String),

    #[error("256-bit value has {0} hex digits, at most 64 allowed")]
    TooLong(usize),
}

/// Parses a big-endian hex string (optionally `0x`-prefixed) into a `U256`.
pub fn u256_from_hex(s: &str) -> Result<U256, MathError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() > 64 {
        return Err(MathError::TooLong(digits.len()));
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MathError::InvalidHex(s.to_string()));
    }
    let padded = format!("{:0>64}", digits);
    let bytes = hex::decode(padded).map_err(|_| MathError::InvalidHex(s.to_string()))?;
    Ok(U256::from_big_endian(&bytes))
}

/// Formats a `U256` as 64 big-endian hex digits.
pub fn u256_to_hex(value: &U256) -> String {
    let mut be = [0u8; 32];
    value.to_big_endian(&mut be);
    hex::encode(be)
}
