//! Header validation for consensus
//!
//! A header is accepted when:
//! - its declared bits equal the bits the chain requires at its height
//! - its version-selected hash meets the target those bits encode

use crate::consensus::chain::{BlockIndexEntry, ChainContext};
use crate::consensus::difficulty::{DifficultyManager, SyncMode};
use consensus_core::config::params::Params;
use consensus_core::errors::ConsensusError;
use consensus_core::header::Header;
use consensus_core::Hash;
use consensus_pow::check_proof_of_work;
use tracing::{debug, trace};

/// Header validator for consensus rules
#[derive(Debug, Clone)]
pub struct HeaderValidator {
    difficulty: DifficultyManager,
}

impl HeaderValidator {
    pub fn new(params: &Params) -> Self {
        Self { difficulty: DifficultyManager::new(params) }
    }

    pub fn difficulty_manager(&self) -> &DifficultyManager {
        &self.difficulty
    }

    /// Validates `header` as the child of `tip` and returns its hash.
    pub fn validate_header<C: ChainContext + ?Sized>(
        &self,
        chain: &C,
        tip: &BlockIndexEntry,
        header: &Header,
        sync_mode: SyncMode,
    ) -> Result<Hash, ConsensusError> {
        let hash = header.hash();
        trace!(%hash, epoch = %header.epoch(), "validating header");

        let expected = self.difficulty.next_required_bits(chain, tip, header, sync_mode)?;
        if header.bits != expected {
            debug!(%hash, expected = format_args!("{expected:#010x}"), found = format_args!("{:#010x}", header.bits), "incorrect proof of work bits");
            return Err(ConsensusError::BadDifficultyBits { expected, found: header.bits });
        }

        self.check_pow(&hash, header)?;
        Ok(hash)
    }

    /// Context-free proof-of-work check of a header against its own bits.
    pub fn check_pow(&self, hash: &Hash, header: &Header) -> Result<(), ConsensusError> {
        if check_proof_of_work(hash, header.bits, header.version, self.difficulty.params()) {
            Ok(())
        } else {
            Err(ConsensusError::InvalidProofOfWork)
        }
    }
}
