//! Retarget window: the first and last block of a finished adjustment period.

use crate::consensus::chain::{BlockIndexEntry, ChainContext};
use consensus_core::errors::DifficultyError;

/// Bounds of the period a retarget measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetargetWindow {
    pub first: BlockIndexEntry,
    pub last: BlockIndexEntry,
}

impl RetargetWindow {
    /// Window ending at `tip` and spanning `interval` blocks.
    pub fn locate<C: ChainContext + ?Sized>(chain: &C, tip: &BlockIndexEntry, interval: i64) -> Result<Self, DifficultyError> {
        let back = u32::try_from(interval - 1).map_err(|_| DifficultyError::ZeroInterval)?;
        let first_height = tip
            .height
            .checked_sub(back)
            .ok_or(DifficultyError::HeightBelowInterval { height: tip.height, interval })?;
        let first = chain.ancestor(tip, first_height).ok_or(DifficultyError::MissingAncestor(first_height))?;
        Ok(Self { first, last: *tip })
    }

    /// Seconds between the first and last block. Negative when timestamps run backwards.
    pub fn actual_timespan(&self) -> i64 {
        i64::from(self.last.timestamp) - i64::from(self.first.timestamp)
    }
}

/// Limits the measured timespan to a factor of four around `target_timespan`.
#[inline]
pub fn clamp_timespan(actual: i64, target_timespan: i64) -> i64 {
    actual.clamp(target_timespan / 4, target_timespan * 4)
}
