use std::path::PathBuf;

use bitcoinlib::Network;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bcl-block", version, about = "Inspect raw Bitcoin blocks and block headers")]
pub struct Cli {
    /// JSON configuration file, defaults to the BCL_CONFIG_FILE environment variable
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Network the blocks belong to, overrides the configured network
    #[arg(long, global = true)]
    pub network: Option<Network>,

    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a serialized block
    Decode {
        /// Block as hexadecimal string
        #[arg(required_unless_present = "file")]
        hex: Option<String>,

        /// File holding the block, either raw bytes or a hexadecimal string
        #[arg(long, conflicts_with = "hex")]
        file: Option<PathBuf>,

        /// Parse all transactions instead of only the coinbase
        #[arg(long)]
        parse_transactions: bool,

        /// Maximum number of transactions to parse, 0 parses all of them
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Expected block hash
        #[arg(long)]
        block_hash: Option<String>,

        #[arg(long, value_parser = parse_number)]
        height: Option<u32>,
    },
    /// Decode an 80 byte block header
    Header { hex: String },
    /// List the BIPs a block version signals at a height
    Bips {
        #[arg(value_parser = parse_number)]
        version: u32,

        #[arg(long, value_parser = parse_number)]
        height: u32,
    },
    /// Expand compact bits into target and difficulty
    Target {
        #[arg(value_parser = parse_number)]
        bits: u32,
    },
}

/// Parses a decimal or `0x` prefixed hexadecimal number
pub fn parse_number(value: &str) -> Result<u32, String> {
    let result = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => value.parse::<u32>(),
    };
    result.map_err(|err| format!("invalid number {}: {}", value, err))
}
