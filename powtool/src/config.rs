use consensus_core::config::params::Params;
use consensus_core::errors::ConfigError;
use consensus_core::network::NetworkType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Tool configuration, read from TOML.
///
/// ```toml
/// network = "testnet"
/// sync_compatibility = true
///
/// # Optional. Replaces the built-in parameters of `network` entirely.
/// [consensus]
/// pow_limit = "00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
/// pow_target_timespan = 1209600
/// pow_target_spacing = 600
/// pow_allow_min_difficulty_blocks = true
/// pow_no_retargeting = false
/// fork_height = 1000
/// fork_premine_window = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkType,
    pub sync_compatibility: bool,
    pub consensus: Option<Params>,
}

impl Config {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|source| ConfigFileError::Read { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&content)?;
        config.params()?;
        Ok(config)
    }

    /// Default configuration for network
    pub fn for_network(network: &str) -> Result<Self, ConfigError> {
        Ok(Config { network: network.parse()?, ..Config::default() })
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &crate::cli::Args) -> Result<(), ConfigError> {
        if let Some(network) = &args.network {
            self.network = network.parse()?;
        }
        if args.sync_compatibility {
            self.sync_compatibility = true;
        }
        Ok(())
    }

    /// Consensus parameters in effect, validated.
    pub fn params(&self) -> Result<Params, ConfigError> {
        let params = self.consensus.clone().unwrap_or_else(|| self.network.params());
        params.validate()?;
        Ok(params)
    }
}
