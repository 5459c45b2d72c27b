use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "powtool")]
#[command(about = "Proof-of-work header hashing, difficulty and validation tool", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses network defaults if not provided)
    #[arg(short, long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Network (mainnet, testnet, regtest)
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Enable the premine-window difficulty override
    #[arg(long, global = true)]
    pub sync_compatibility: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the epoch and hash of a serialized header
    Hash {
        /// 80-byte header as hex
        header: String,
    },

    /// Check a header's hash against its own bits
    Check {
        /// 80-byte header as hex
        header: String,
    },

    /// Required bits for the block after the chain tip
    NextBits {
        /// JSON list of chain entries, ordered from genesis
        #[arg(long)]
        chain: PathBuf,

        /// Candidate block timestamp
        #[arg(long)]
        time: u32,

        /// Candidate block version, decimal or 0x-prefixed hex
        #[arg(long, default_value = "1", value_parser = parse_version)]
        version: i32,
    },

    /// Validate a header as the child of the chain tip
    Validate {
        /// JSON list of chain entries, ordered from genesis
        #[arg(long)]
        chain: PathBuf,

        /// 80-byte header as hex
        header: String,
    },

    /// Print the effective consensus parameters as TOML
    Params,
}

/// Accepts `536870912`, `0x20000000` and negative decimals.
pub fn parse_version(s: &str) -> Result<i32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16).map(|v| v as i32),
        None => s.parse::<i32>(),
    };
    parsed.map_err(|e| format!("invalid version '{s}': {e}"))
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_parse_in_both_radixes() {
        assert_eq!(parse_version("4"), Ok(4));
        assert_eq!(parse_version("0x20000000"), Ok(0x2000_0000));
        assert_eq!(parse_version("0xffffffff"), Ok(-1));
        assert_eq!(parse_version("-2"), Ok(-2));
        assert!(parse_version("0xzz").is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "powtool",
            "next-bits",
            "--chain",
            "chain.json",
            "--time",
            "1700000000",
            "--version",
            "0x20000000",
            "--network",
            "testnet",
            "--sync-compatibility",
        ])
        .unwrap();
        assert_eq!(args.network.as_deref(), Some("testnet"));
        assert!(args.sync_compatibility);
        assert!(matches!(args.command, Command::NextBits { time: 1_700_000_000, version: 0x2000_0000, .. }));
    }
}
