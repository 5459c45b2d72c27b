use crate::U256;

/// Version bits reserved for soft-fork signalling. A header whose version is
/// at or above this value (compared as a signed integer) belongs to the
/// post-fork epoch.
pub const VERSIONBITS_TOP_BITS: i32 = 0x2000_0000;

/// Serialized header length in bytes.
pub const HEADER_SIZE: usize = crypto_hashes::HEADER_INPUT_SIZE;

/// Easiest target accepted for post-fork headers:
/// `0x0000007fffffffffffffffffffffffffffffffffffffffffffffffffffffffff`.
pub const POST_FORK_WORK_LIMIT: U256 = U256([u64::MAX, u64::MAX, u64::MAX, 0x0000_007f_ffff_ffff]);

/// Two weeks, in seconds.
pub const DEFAULT_POW_TARGET_TIMESPAN: i64 = 14 * 24 * 60 * 60;

/// Ten minutes, in seconds.
pub const DEFAULT_POW_TARGET_SPACING: i64 = 10 * 60;
