use crate::constants::HEADER_SIZE;
use crate::epoch::Epoch;
use crate::errors::HeaderDecodeError;
use crate::{hashing, Hash};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block header in its 80-byte wire layout.
///
/// Borsh encodes integers little-endian and fixed arrays verbatim, so the
/// derived Borsh form is byte-for-byte the consensus serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub version: i32,
    pub hash_prev_block: Hash,
    pub hash_merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl Header {
    pub fn new(version: i32, hash_prev_block: Hash, hash_merkle_root: Hash, timestamp: u32, bits: u32, nonce: u32) -> Self {
        Self { version, hash_prev_block, hash_merkle_root, timestamp, bits, nonce }
    }

    pub fn epoch(&self) -> Epoch {
        Epoch::from_version(self.version)
    }

    /// Serialized header, starting at the version field.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(self.hash_prev_block.as_bytes());
        out[36..68].copy_from_slice(self.hash_merkle_root.as_bytes());
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderDecodeError> {
        if bytes.len() != HEADER_SIZE {
            return Err(HeaderDecodeError::InvalidLength { expected: HEADER_SIZE, found: bytes.len() });
        }
        // Length is checked above, so every field is present.
        Header::try_from_slice(bytes)
            .map_err(|_| HeaderDecodeError::InvalidLength { expected: HEADER_SIZE, found: bytes.len() })
    }

    pub fn from_hex(s: &str) -> Result<Self, HeaderDecodeError> {
        let bytes = hex::decode(s.trim())?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Identity and proof-of-work hash, selected by version.
    pub fn hash(&self) -> Hash {
        hashing::header::calculate_header_hash(self)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header(hash={}, ver={:#010x}, epoch={}, hash_prev_block={}, hash_merkle_root={}, time={}, bits={:08x}, nonce={})",
            self.hash(),
            self.version,
            self.epoch(),
            self.hash_prev_block,
            self.hash_merkle_root,
            self.timestamp,
            self.bits,
            self.nonce
        )
    }
}
