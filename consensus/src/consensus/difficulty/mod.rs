//! Difficulty adjustment module for consensus
//!
//! Derives the compact target every block must carry from the chain it
//! extends: periodic retargeting, the premine window and the testnet
//! min-difficulty rules.

pub mod manager;
pub mod window;

pub use manager::DifficultyManager;
pub use window::RetargetWindow;

use serde::{Deserialize, Serialize};

/// Runtime toggle for the premine-window override.
///
/// Read by the caller at call time and passed into every difficulty query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    #[default]
    Standard,
    /// Blocks inside the premine window are minable at the work limit.
    Compatibility,
}

impl SyncMode {
    #[inline]
    pub fn is_compatibility(self) -> bool {
        matches!(self, SyncMode::Compatibility)
    }
}

impl From<bool> for SyncMode {
    fn from(compatibility: bool) -> Self {
        if compatibility {
            SyncMode::Compatibility
        } else {
            SyncMode::Standard
        }
    }
}
