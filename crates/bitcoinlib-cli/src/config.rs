use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bitcoinlib::Network;
use serde::Deserialize;

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "BCL_CONFIG_FILE";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Network used when none is given on the command line
    pub network: Network,
    /// Parse all transactions when decoding blocks
    pub parse_transactions: bool,
    /// Log filter used when RUST_LOG is not set
    pub log_level: Option<String>,
}

impl Config {
    /// Loads the configuration from `path`, or from the file named by `BCL_CONFIG_FILE`.
    /// Without either the defaults apply.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(CONFIG_FILE_ENV) {
                Some(path) => PathBuf::from(path),
                None => return Ok(Config::default()),
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Config> {
        let raw = fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }
}
