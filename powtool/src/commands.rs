//! Subcommand implementations. Each returns a [`Report`] for the caller to print.

use crate::cli::Command;
use crate::config::Config;
use anyhow::{Context, Result};
use consensus::{ActiveChain, BlockIndexEntry, ChainContext, DifficultyManager, HeaderValidator, SyncMode};
use consensus_core::config::params::Params;
use consensus_core::errors::ConsensusError;
use consensus_core::{Epoch, Hash, Header};
use consensus_pow::{calc_work, check_proof_of_work};
use rrbtc_math::{compact_from_target, target_from_compact, u256_to_hex};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Titled list of results. `verdict` is set by commands that accept or reject something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: &'static str,
    pub fields: Vec<(String, String)>,
    pub verdict: Option<bool>,
}

impl Report {
    fn new(title: &'static str) -> Self {
        Self { title, fields: Vec::new(), verdict: None }
    }

    fn field(mut self, key: &str, value: impl ToString) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

pub fn run(config: &Config, command: &Command) -> Result<Report> {
    let params = config.params().context("invalid consensus parameters")?;
    let sync_mode = SyncMode::from(config.sync_compatibility);
    match command {
        Command::Hash { header } => hash(header),
        Command::Check { header } => check(header, &params),
        Command::NextBits { chain, time, version } => next_bits(&load_chain(chain)?, *time, *version, &params, sync_mode),
        Command::Validate { chain, header } => validate(&load_chain(chain)?, header, &params, sync_mode),
        Command::Params => Ok(describe_params(config, &params)),
    }
}

/// Reads a JSON list of [`BlockIndexEntry`] ordered from genesis.
pub fn load_chain(path: &Path) -> Result<ActiveChain> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read chain file {}", path.display()))?;
    let entries: Vec<BlockIndexEntry> =
        serde_json::from_str(&content).with_context(|| format!("failed to parse chain file {}", path.display()))?;
    let chain = ActiveChain::from_entries(entries)?;
    debug!(blocks = chain.len(), "loaded chain");
    Ok(chain)
}

fn parse_header(hex: &str) -> Result<Header> {
    Header::from_hex(hex).context("invalid header")
}

fn bits_hex(bits: u32) -> String {
    format!("{bits:#010x}")
}

pub fn hash(hex: &str) -> Result<Report> {
    let header = parse_header(hex)?;
    Ok(Report::new("Header hash")
        .field("epoch", header.epoch())
        .field("version", format!("{:#010x}", header.version))
        .field("hash", header.hash()))
}

pub fn check(hex: &str, params: &Params) -> Result<Report> {
    let header = parse_header(hex)?;
    let hash = header.hash();
    let epoch = header.epoch();
    let valid = check_proof_of_work(&hash, header.bits, header.version, params);
    info!(%hash, valid, "checked proof of work");

    let mut report = Report::new("Proof of work")
        .field("hash", hash)
        .field("epoch", epoch)
        .field("bits", bits_hex(header.bits))
        .field("target", u256_to_hex(&target_from_compact(header.bits).target))
        .field("work limit", u256_to_hex(&epoch.work_limit(params)))
        .field("work", calc_work(header.bits));
    report.verdict = Some(valid);
    Ok(report)
}

pub fn next_bits(chain: &ActiveChain, time: u32, version: i32, params: &Params, sync_mode: SyncMode) -> Result<Report> {
    let tip = chain.tip().context("chain is empty")?;
    let candidate = Header::new(version, Hash::zeroed(), Hash::zeroed(), time, 0, 0);
    let bits = DifficultyManager::new(params).next_required_bits(chain, &tip, &candidate, sync_mode)?;

    Ok(Report::new("Next required bits")
        .field("height", tip.height.saturating_add(1))
        .field("epoch", candidate.epoch())
        .field("bits", bits_hex(bits))
        .field("target", u256_to_hex(&target_from_compact(bits).target)))
}

pub fn validate(chain: &ActiveChain, hex: &str, params: &Params, sync_mode: SyncMode) -> Result<Report> {
    let tip = chain.tip().context("chain is empty")?;
    let header = parse_header(hex)?;
    let validator = HeaderValidator::new(params);

    let mut report = Report::new("Header validation").field("height", tip.height.saturating_add(1));
    match validator.validate_header(chain, &tip, &header, sync_mode) {
        Ok(hash) => {
            report = report.field("hash", hash);
            report.verdict = Some(true);
        }
        Err(err @ (ConsensusError::BadDifficultyBits { .. } | ConsensusError::InvalidProofOfWork)) => {
            report = report.field("hash", header.hash()).field("reason", err);
            report.verdict = Some(false);
        }
        Err(err) => return Err(err).context("cannot validate against this chain"),
    }
    Ok(report)
}

fn describe_params(config: &Config, params: &Params) -> Report {
    let network = match config.consensus {
        Some(_) => format!("{} (custom parameters)", config.network),
        None => config.network.to_string(),
    };
    Report::new("Consensus parameters")
        .field("network", network)
        .field("pow limit", u256_to_hex(&params.pow_limit))
        .field("pow limit bits", bits_hex(compact_from_target(&params.pow_limit)))
        .field("post-fork limit bits", bits_hex(Epoch::PostFork.work_limit_bits(params)))
        .field("target timespan", params.pow_target_timespan)
        .field("target spacing", params.pow_target_spacing)
        .field("adjustment interval", params.difficulty_adjustment_interval())
        .field("min difficulty blocks", params.pow_allow_min_difficulty_blocks)
        .field("no retargeting", params.pow_no_retargeting)
        .field("fork height", params.fork_height)
        .field("premine window", params.fork_premine_window)
        .field("sync compatibility", config.sync_compatibility)
}
