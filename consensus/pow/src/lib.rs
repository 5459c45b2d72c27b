//! Proof-of-work verdicts: target checks, block work and nonce search.

use std::ops::Range;

use consensus_core::config::params::Params;
use consensus_core::epoch::Epoch;
use consensus_core::hashing;
use consensus_core::header::Header;
use crypto_hashes::Hash;
use primitive_types::U256;
use rrbtc_math::target_from_compact;
use tracing::debug;

/// Reads a digest as the 256-bit integer compared against targets.
#[inline]
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_little_endian(hash.as_bytes())
}

/// Decodes `bits` and checks it against the work limit of `epoch`.
/// Returns the target only when it is positive, in range and not looser than the limit.
fn epoch_target(bits: u32, epoch: Epoch, params: &Params) -> Option<U256> {
    let decoded = target_from_compact(bits);
    if decoded.negative {
        debug!(bits = format_args!("{bits:#010x}"), "nBits below minimum work: negative target");
        return None;
    }
    if decoded.overflow {
        debug!(bits = format_args!("{bits:#010x}"), "nBits below minimum work: target overflow");
        return None;
    }
    if decoded.target.is_zero() {
        debug!(bits = format_args!("{bits:#010x}"), "nBits below minimum work: zero target");
        return None;
    }
    if decoded.target > epoch.work_limit(params) {
        debug!(bits = format_args!("{bits:#010x}"), %epoch, "nBits below minimum work: target above work limit");
        return None;
    }
    Some(decoded.target)
}

/// Checks that `hash` satisfies the target encoded in `bits` and that the
/// target is within the work limit of the epoch `version` selects.
///
/// Every failure collapses into `false`. The cause is only visible in the
/// debug log.
pub fn check_proof_of_work(hash: &Hash, bits: u32, version: i32, params: &Params) -> bool {
    let Some(target) = epoch_target(bits, Epoch::from_version(version), params) else {
        return false;
    };
    if hash_to_u256(hash) > target {
        debug!(%hash, bits = format_args!("{bits:#010x}"), "hash doesn't match nBits");
        return false;
    }
    true
}

/// Expected number of hashes needed to meet `bits`, or zero when the
/// encoding is not a valid positive target.
///
/// Equals `2^256 / (target + 1)`, computed as `!target / (target + 1) + 1`
/// so it fits in 256 bits.
pub fn calc_work(bits: u32) -> U256 {
    match target_from_compact(bits).valid_target() {
        Some(target) if target != U256::MAX => (!target / (target + 1)) + 1,
        Some(_) => U256::one(),
        None => U256::zero(),
    }
}

/// State is an intermediate data structure with pre-computed values to speed up mining.
pub struct State {
    header: Header,
    /// `None` when the header's bits can never be satisfied.
    target: Option<U256>,
}

impl State {
    #[inline]
    pub fn new(header: &Header, params: &Params) -> Self {
        let target = epoch_target(header.bits, header.epoch(), params);
        Self { header: *header, target }
    }

    #[inline]
    #[must_use]
    pub fn calculate_pow(&self, nonce: u32) -> Hash {
        hashing::header::hash_override_nonce(&self.header, nonce)
    }

    #[inline]
    #[must_use]
    pub fn check_pow(&self, nonce: u32) -> (bool, U256) {
        let pow = hash_to_u256(&self.calculate_pow(nonce));
        // The pow hash must be less or equal than the claimed target.
        let passed = self.target.is_some_and(|target| pow <= target);
        (passed, pow)
    }

    /// Scans `nonces` in order and returns the first one that meets the target.
    pub fn mine(&self, nonces: Range<u32>) -> Option<(u32, Hash)> {
        if self.target.is_none() {
            return None;
        }
        for nonce in nonces {
            if let (true, _) = self.check_pow(nonce) {
                let hash = self.calculate_pow(nonce);
                debug!(nonce, %hash, "found proof of work");
                return Some((nonce, hash));
            }
        }
        None
    }
}
