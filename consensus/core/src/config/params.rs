use crate::constants::{DEFAULT_POW_TARGET_SPACING, DEFAULT_POW_TARGET_TIMESPAN};
use crate::errors::ConfigError;
use crate::{BlockHeight, U256};
use rrbtc_math::u256_from_hex;
use serde::{Deserialize, Serialize};

/// Proof-of-work consensus parameters of one network.
///
/// Loaded once at start-up and shared read-only by every consensus
/// component. The sync-compatibility toggle is deliberately not part of
/// this struct: it is a runtime setting passed to each difficulty call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Easiest target allowed for legacy-epoch headers.
    #[serde(with = "rrbtc_math::serde_hex")]
    pub pow_limit: U256,
    /// Intended duration of one retarget period, in seconds.
    pub pow_target_timespan: i64,
    /// Intended time between blocks, in seconds.
    pub pow_target_spacing: i64,
    /// Testnet rule: allow min-difficulty blocks after a long gap.
    pub pow_allow_min_difficulty_blocks: bool,
    /// Freeze difficulty forever.
    pub pow_no_retargeting: bool,
    /// First height of the premine window.
    pub fork_height: BlockHeight,
    /// Number of blocks in the premine window, starting at `fork_height`.
    pub fork_premine_window: BlockHeight,
}

impl Params {
    pub fn mainnet() -> Self {
        Self {
            pow_limit: hex_limit("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            pow_target_timespan: DEFAULT_POW_TARGET_TIMESPAN,
            pow_target_spacing: DEFAULT_POW_TARGET_SPACING,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            fork_height: 498_777,
            fork_premine_window: 8_064,
        }
    }

    pub fn testnet() -> Self {
        Self {
            pow_allow_min_difficulty_blocks: true,
            fork_height: 1_210_000,
            fork_premine_window: 2_016,
            ..Self::mainnet()
        }
    }

    pub fn regtest() -> Self {
        Self {
            pow_limit: hex_limit("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: true,
            fork_height: 3_000,
            fork_premine_window: 100,
            ..Self::mainnet()
        }
    }

    /// Blocks per retarget period.
    #[inline]
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        if self.pow_target_spacing == 0 {
            return 0;
        }
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Half-open premine window `[fork_height, fork_height + fork_premine_window)`.
    pub fn in_premine_window(&self, height: BlockHeight) -> bool {
        let start = u64::from(self.fork_height);
        let end = start + u64::from(self.fork_premine_window);
        (start..end).contains(&u64::from(height))
    }

    /// Rejects parameter sets the difficulty rules cannot operate on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pow_target_spacing <= 0 {
            return Err(ConfigError::NonPositiveSpacing(self.pow_target_spacing));
        }
        if self.pow_target_timespan <= 0 {
            return Err(ConfigError::NonPositiveTimespan(self.pow_target_timespan));
        }
        if self.difficulty_adjustment_interval() == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.pow_limit.is_zero() {
            return Err(ConfigError::ZeroPowLimit);
        }
        Ok(())
    }
}

fn hex_limit(s: &str) -> U256 {
    // Only called on the literals above.
    u256_from_hex(s).unwrap_or_default()
}
