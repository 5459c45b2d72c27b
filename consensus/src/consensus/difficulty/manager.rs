//! Difficulty manager for consensus
//!
//! Computes the compact target required of the next block on a chain.

use super::window::{clamp_timespan, RetargetWindow};
use super::SyncMode;
use crate::consensus::chain::{BlockIndexEntry, ChainContext};
use consensus_core::config::params::Params;
use consensus_core::errors::DifficultyError;
use consensus_core::header::Header;
use rrbtc_math::{compact_from_target, target_from_compact, U256, U512};
use tracing::{debug, trace};

/// Difficulty manager for consensus
#[derive(Debug, Clone)]
pub struct DifficultyManager {
    params: Params,
}

impl DifficultyManager {
    pub fn new(params: &Params) -> Self {
        Self { params: params.clone() }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Bits the block on top of `tip` must declare.
    ///
    /// Rules, first match wins:
    /// 1. in compatibility mode, heights inside the premine window get the work limit;
    /// 2. between retarget boundaries the previous difficulty carries over, subject to
    ///    the min-difficulty rules when the network allows them;
    /// 3. on a boundary the target is rescaled by the time the last period took.
    pub fn next_required_bits<C: ChainContext + ?Sized>(
        &self,
        chain: &C,
        tip: &BlockIndexEntry,
        candidate: &Header,
        sync_mode: SyncMode,
    ) -> Result<u32, DifficultyError> {
        let interval = self.params.difficulty_adjustment_interval();
        if interval <= 0 {
            return Err(DifficultyError::ZeroInterval);
        }
        self.target_timespan()?;
        if !chain.contains(tip) {
            return Err(DifficultyError::TipNotInChain(tip.height));
        }

        let next_height = tip.height.saturating_add(1);
        let limit_bits = candidate.epoch().work_limit_bits(&self.params);

        if sync_mode.is_compatibility() && self.params.in_premine_window(next_height) {
            debug!(next_height, bits = format_args!("{limit_bits:#010x}"), "premine window, using work limit");
            return Ok(limit_bits);
        }

        if i64::from(next_height) % interval != 0 {
            if !self.params.pow_allow_min_difficulty_blocks {
                return Ok(tip.bits);
            }

            let max_gap = self.params.pow_target_spacing.saturating_mul(2);
            if i64::from(candidate.timestamp) > i64::from(tip.timestamp).saturating_add(max_gap) {
                debug!(next_height, tip_time = tip.timestamp, time = candidate.timestamp, "block gap exceeded, allowing min-difficulty block");
                return Ok(limit_bits);
            }

            return self.last_non_special_bits(chain, tip, interval, limit_bits);
        }

        let window = RetargetWindow::locate(chain, tip, interval)?;
        trace!(first = window.first.height, elapsed = window.actual_timespan(), "retarget window");
        self.calculate_next_work_required(&window.last, i64::from(window.first.timestamp))
    }

    fn target_timespan(&self) -> Result<i64, DifficultyError> {
        match self.params.pow_target_timespan {
            timespan if timespan > 0 => Ok(timespan),
            timespan => Err(DifficultyError::NonPositiveTimespan(timespan)),
        }
    }

    /// Bits of the closest block that was not mined under the min-difficulty
    /// exception, stopping at retarget boundaries and at genesis.
    ///
    /// A gap in the chain view above genesis is reported, never walked past.
    fn last_non_special_bits<C: ChainContext + ?Sized>(
        &self,
        chain: &C,
        tip: &BlockIndexEntry,
        interval: i64,
        limit_bits: u32,
    ) -> Result<u32, DifficultyError> {
        let mut index = *tip;
        while index.height != 0 && i64::from(index.height) % interval != 0 && index.bits == limit_bits {
            index = chain.predecessor(&index).ok_or(DifficultyError::MissingAncestor(index.height - 1))?;
        }
        trace!(tip = tip.height, found = index.height, "walked back over min-difficulty blocks");
        Ok(index.bits)
    }

    /// Rescales the target of `tip` by the time the finished period took.
    ///
    /// The elapsed time is clamped to a factor of four around the target
    /// timespan and the result is capped at `params.pow_limit`, for every epoch.
    pub fn calculate_next_work_required(&self, tip: &BlockIndexEntry, first_block_time: i64) -> Result<u32, DifficultyError> {
        if self.params.pow_no_retargeting {
            return Ok(tip.bits);
        }

        let target_timespan = self.target_timespan()?;
        let actual = clamp_timespan(i64::from(tip.timestamp) - first_block_time, target_timespan);

        let old_target = target_from_compact(tip.bits).target;
        // Multiply in 512 bits so the product cannot wrap.
        let scaled = old_target.full_mul(U256::from(actual.max(0) as u64)) / U512::from(target_timespan as u64);

        let pow_limit = self.params.pow_limit;
        let new_target = if scaled > U512::from(pow_limit) {
            pow_limit
        } else {
            U256::try_from(scaled).unwrap_or(pow_limit)
        };

        let bits = compact_from_target(&new_target);
        debug!(
            height = tip.height.saturating_add(1),
            actual_timespan = actual,
            before = format_args!("{:#010x}", tip.bits),
            after = format_args!("{bits:#010x}"),
            "difficulty retarget"
        );
        Ok(bits)
    }
}
