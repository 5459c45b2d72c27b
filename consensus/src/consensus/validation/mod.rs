//! Validation module for consensus
//!
//! Contextual proof-of-work validation of block headers.

pub mod header_validator;

pub use header_validator::HeaderValidator;
