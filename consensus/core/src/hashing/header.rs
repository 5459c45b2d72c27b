//! Version-gated header hashing.

use crate::epoch::Epoch;
use crate::header::Header;
use crate::Hash;
use crypto_hashes::{BlockHash, Hasher, HasherBase, PowHash};

/// Canonical hash of a header: SHA-256d for legacy versions, Lyra2Z from
/// the post-fork version onward. Used both as block identity and as the
/// value checked against the target.
pub fn calculate_header_hash(header: &Header) -> Hash {
    match header.epoch() {
        Epoch::Legacy => legacy_header_hash(header),
        Epoch::PostFork => lyra2z_header_hash(header),
    }
}

pub fn legacy_header_hash(header: &Header) -> Hash {
    let mut hasher = BlockHash::new();
    hasher.update(header.to_bytes());
    hasher.finalize()
}

pub fn lyra2z_header_hash(header: &Header) -> Hash {
    PowHash::hash(header.to_bytes())
}

/// Hash of `header` with `nonce` substituted, for nonce search.
pub fn hash_override_nonce(header: &Header, nonce: u32) -> Hash {
    calculate_header_hash(&Header { nonce, ..*header })
}
