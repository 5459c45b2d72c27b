//! Consensus primitives shared by the proof-of-work crates: block headers,
//! the version-selected hashing epoch, and per-network consensus parameters.

pub mod config;
pub mod constants;
pub mod epoch;
pub mod errors;
pub mod hashing;
pub mod header;
pub mod network;

pub use crypto_hashes::Hash;
pub use epoch::Epoch;
pub use header::Header;
pub use rrbtc_math::U256;

/// Block height on the active chain. Genesis is height 0.
pub type BlockHeight = u32;
