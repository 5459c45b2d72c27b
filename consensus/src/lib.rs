//! Consensus library for the proof-of-work chain
//!
//! This library decides which target a block must meet and whether a header
//! meets it: per-network difficulty retargeting over the active chain and
//! version-gated proof-of-work validation.

pub mod consensus;

// Re-export key types for easier access
pub use consensus::chain::{ActiveChain, BlockIndexEntry, ChainContext, ChainError};
pub use consensus::difficulty::{DifficultyManager, SyncMode};
pub use consensus::validation::HeaderValidator;
pub use consensus_core::{Hash, Header};
