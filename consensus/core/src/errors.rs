use crate::BlockHeight;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    #[error("Bad difficulty bits: expected {expected:#010x}, found {found:#010x}")]
    BadDifficultyBits { expected: u32, found: u32 },

    #[error("Invalid proof of work")]
    InvalidProofOfWork,

    #[error("Difficulty error: {0}")]
    Difficulty(#[from] DifficultyError),

    #[error("Header decode error: {0}")]
    HeaderDecode(#[from] HeaderDecodeError),
}

/// Failures of the difficulty rules. All of them mean the caller handed in a
/// chain view the rules cannot run on; none is a verdict about a header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("Difficulty adjustment interval is zero")]
    ZeroInterval,

    #[error("Target timespan must be positive, got {0}")]
    NonPositiveTimespan(i64),

    #[error("Retarget at height {height} needs {interval} blocks of history")]
    HeightBelowInterval { height: BlockHeight, interval: i64 },

    #[error("Missing ancestor at height {0}")]
    MissingAncestor(BlockHeight),

    #[error("Block at height {0} is not on the active chain")]
    TipNotInChain(BlockHeight),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Target spacing must be positive, got {0}")]
    NonPositiveSpacing(i64),

    #[error("Target timespan must be positive, got {0}")]
    NonPositiveTimespan(i64),

    #[error("Target timespan is shorter than one block spacing")]
    ZeroInterval,

    #[error("Proof-of-work limit is zero")]
    ZeroPowLimit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderDecodeError {
    #[error("Header must be {expected} bytes, got {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;
