//! Builds chains header by header through the public API.

use consensus::{ActiveChain, ChainContext, DifficultyManager, HeaderValidator, SyncMode};
use consensus_core::config::params::Params;
use consensus_core::constants::POST_FORK_WORK_LIMIT;
use consensus_core::errors::ConsensusError;
use consensus_core::network::NetworkType;
use consensus_core::{Hash, Header, U256};
use consensus_pow::State;
use rrbtc_math::{compact_from_target, target_from_compact};

const POST_FORK: i32 = 0x2000_0000;

fn test_params() -> Params {
    Params {
        pow_limit: U256::MAX >> 2,
        pow_target_timespan: 20 * 60,
        pow_target_spacing: 60,
        pow_allow_min_difficulty_blocks: false,
        pow_no_retargeting: false,
        fork_height: 40,
        fork_premine_window: 10,
    }
}

/// Extends `chain` with a header mined at the required difficulty.
fn extend(chain: &mut ActiveChain, validator: &HeaderValidator, version: i32, spacing: u32, mode: SyncMode) -> Header {
    let tip = chain.tip().unwrap();
    let mut header = Header::new(version, Hash::from_le_u64([tip.height as u64, 0, 0, 0]), Hash::zeroed(), tip.timestamp + spacing, 0, 0);
    header.bits = validator.difficulty_manager().next_required_bits(chain, &tip, &header, mode).unwrap();
    let (nonce, _) = State::new(&header, validator.difficulty_manager().params()).mine(0..u32::MAX).unwrap();
    header.nonce = nonce;
    validator.validate_header(chain, &tip, &header, mode).unwrap();
    chain.push_header(&header).unwrap();
    header
}

fn genesis(bits: u32) -> ActiveChain {
    let header = Header::new(1, Hash::zeroed(), Hash::zeroed(), 1_700_000_000, bits, 0);
    ActiveChain::from_headers([header].iter())
}

#[test]
fn fast_blocks_raise_difficulty_each_period() {
    let params = test_params();
    let validator = HeaderValidator::new(&params);
    let start_bits = 0x2000_ffff;
    let mut chain = genesis(start_bits);

    for _ in 0..59 {
        extend(&mut chain, &validator, 1, 30, SyncMode::Standard);
    }

    // Blocks arrive twice as fast as intended, so the retargets at 20 and 40 tighten the target.
    let at = |h| target_from_compact(chain.entry_at(h).unwrap().bits).target;
    assert_eq!(at(19), target_from_compact(start_bits).target);
    assert!(at(20) < at(19));
    assert!(at(40) < at(20));
    assert_eq!(at(39), at(20));
}

#[test]
fn premine_window_switches_to_post_fork_limit() {
    let params = test_params();
    let manager = DifficultyManager::new(&params);
    let limit_bits = compact_from_target(&POST_FORK_WORK_LIMIT);
    let mut chain = genesis(0x2000_ffff);

    // Post-fork targets are too hard to mine here, so only the required bits are checked.
    for height in 1..=50u32 {
        let tip = chain.tip().unwrap();
        let version = if height >= params.fork_height { POST_FORK } else { 1 };
        let candidate = Header::new(version, Hash::zeroed(), Hash::zeroed(), tip.timestamp + 60, 0, 0);
        let bits = manager.next_required_bits(&chain, &tip, &candidate, SyncMode::Compatibility).unwrap();
        if (40..50).contains(&height) {
            assert_eq!(bits, limit_bits, "height {height}");
        }
        chain.push_header(&Header { bits, ..candidate }).unwrap();
    }

    // Height 50 is past the window but not a boundary, so the limit carries over.
    assert_eq!(chain.tip().unwrap().height, 50);
    assert_eq!(chain.tip().unwrap().bits, limit_bits);

    let standard = manager
        .next_required_bits(&chain, &chain.entry_at(44).unwrap(), &Header::new(POST_FORK, Hash::zeroed(), Hash::zeroed(), 0, 0, 0), SyncMode::Standard)
        .unwrap();
    assert_eq!(standard, limit_bits);
}

#[test]
fn stale_bits_are_rejected_after_retarget() {
    let params = test_params();
    let validator = HeaderValidator::new(&params);
    let mut chain = genesis(0x2000_ffff);
    for _ in 0..19 {
        extend(&mut chain, &validator, 1, 10, SyncMode::Standard);
    }
    let tip = chain.tip().unwrap();
    let header = Header::new(1, Hash::zeroed(), Hash::zeroed(), tip.timestamp + 10, tip.bits, 0);
    let header = Header { nonce: State::new(&header, &params).mine(0..u32::MAX).unwrap().0, ..header };
    let err = validator.validate_header(&chain, &tip, &header, SyncMode::Standard).unwrap_err();
    assert!(matches!(err, ConsensusError::BadDifficultyBits { found, .. } if found == tip.bits));
}

#[test]
fn builtin_networks_retarget_from_their_limit() {
    for network in NetworkType::iter() {
        let params = network.params();
        let manager = DifficultyManager::new(&params);
        let limit_bits = compact_from_target(&params.pow_limit);
        let mut chain = ActiveChain::new();
        let interval = params.difficulty_adjustment_interval() as u32;
        for height in 0..interval {
            chain.push(consensus::BlockIndexEntry { height, timestamp: height * 600, bits: limit_bits, version: 1 }).unwrap();
        }
        let tip = chain.tip().unwrap();
        let candidate = Header::new(1, Hash::zeroed(), Hash::zeroed(), tip.timestamp + 600, 0, 0);
        let bits = manager.next_required_bits(&chain, &tip, &candidate, SyncMode::Standard).unwrap();
        if params.pow_no_retargeting {
            assert_eq!(bits, limit_bits, "{network}");
        } else {
            assert!(target_from_compact(bits).target < params.pow_limit, "{network}");
        }
    }
}
