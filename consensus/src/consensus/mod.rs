//! Consensus module for the proof-of-work chain
//!
//! Chain view, difficulty rules and header validation.

pub mod chain;
pub mod difficulty;
pub mod validation;

pub use chain::{ActiveChain, BlockIndexEntry, ChainContext, ChainError};
pub use difficulty::{DifficultyManager, RetargetWindow, SyncMode};
pub use validation::HeaderValidator;
