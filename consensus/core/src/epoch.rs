//! Version-gated consensus epochs.
//!
//! The header version alone decides which proof-of-work hash and which work
//! limit apply. Both the hasher and the difficulty code go through [`Epoch`]
//! so they can never disagree about a header.

use crate::config::params::Params;
use crate::constants::{POST_FORK_WORK_LIMIT, VERSIONBITS_TOP_BITS};
use crate::U256;
use rrbtc_math::compact_from_target;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Epoch {
    /// SHA-256d identity hash, `params.pow_limit` ceiling.
    Legacy,
    /// Lyra2Z hash, [`POST_FORK_WORK_LIMIT`] ceiling.
    PostFork,
}

impl Epoch {
    /// Negative versions compare below the signal bits and stay legacy.
    #[inline]
    pub fn from_version(version: i32) -> Self {
        if version >= VERSIONBITS_TOP_BITS {
            Epoch::PostFork
        } else {
            Epoch::Legacy
        }
    }

    /// The loosest target a header of this epoch may claim.
    #[inline]
    pub fn work_limit(self, params: &Params) -> U256 {
        match self {
            Epoch::Legacy => params.pow_limit,
            Epoch::PostFork => POST_FORK_WORK_LIMIT,
        }
    }

    /// [`Epoch::work_limit`] in compact form.
    pub fn work_limit_bits(self, params: &Params) -> u32 {
        compact_from_target(&self.work_limit(params))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epoch::Legacy => write!(f, "legacy"),
            Epoch::PostFork => write!(f, "post-fork"),
        }
    }
}
