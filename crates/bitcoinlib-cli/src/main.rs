use std::fs;
use std::path::Path;

use anyhow::Context;
use bitcoinlib::{Block, BlockHeader, BlockSummary, H256Le, Network, ParseOptions};
use clap::Parser;
use log::{debug, info};
use serde::Serialize;

mod cli;
mod config;

use cli::{Cli, Commands};
use config::Config;

#[derive(Serialize, Debug)]
struct BlockOutput {
    #[serde(flatten)]
    summary: BlockSummary,
    network: Network,
    version_bips: Vec<&'static str>,
    proof_of_work: bool,
}

#[derive(Serialize, Debug)]
struct BipsOutput {
    version: u32,
    version_bin: String,
    height: u32,
    bips: Vec<&'static str>,
}

#[derive(Serialize, Debug)]
struct TargetOutput {
    bits: u32,
    target: String,
    difficulty: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config);
    let network = cli.network.unwrap_or(config.network);
    debug!("Using network {}", network);

    match cli.command {
        Commands::Decode {
            hex,
            file,
            parse_transactions,
            limit,
            block_hash,
            height,
        } => {
            let raw = match (hex, file) {
                (_, Some(path)) => read_block_file(&path)?,
                (Some(hex), None) => decode_hex(&hex)?,
                (None, None) => anyhow::bail!("either a block hex string or --file is required"),
            };
            let block_hash = block_hash
                .map(|hash| H256Le::from_hex_be(&hash))
                .transpose()
                .context("invalid block hash")?;
            let options = ParseOptions {
                block_hash,
                height,
                parse_transactions: parse_transactions || config.parse_transactions,
                limit,
                network,
            };
            let block = Block::from_raw(&raw, options).context("failed to decode block")?;
            info!("Decoded {}", block);
            print_block(cli.json, &block)
        }
        Commands::Header { hex } => {
            let header = BlockHeader::from_hex(hex.trim()).context("failed to decode block header")?;
            let block = Block::new(header, vec![], None, network)?;
            print_block(cli.json, &block)
        }
        Commands::Bips { version, height } => {
            let header = BlockHeader {
                version,
                ..Default::default()
            };
            let block = Block::new(header, vec![], Some(height), network)?;
            let output = BipsOutput {
                version,
                version_bin: block.version_bin(),
                height,
                bips: block.version_bips(),
            };
            print_one(cli.json, output, |output| {
                format!("{} {}", output.version_bin, output.bips.join(" "))
                    .trim_end()
                    .to_string()
            })
        }
        Commands::Target { bits } => {
            let output = TargetOutput {
                bits,
                target: bitcoinlib::pow::target_hex(bits),
                difficulty: bitcoinlib::pow::difficulty(bits),
            };
            print_one(cli.json, output, |output| {
                format!("target {}\ndifficulty {}", output.target, output.difficulty)
            })
        }
    }
}

fn init_logging(config: &Config) {
    let default_filter = config.log_level.as_deref().unwrap_or("warn");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn decode_hex(hex: &str) -> anyhow::Result<Vec<u8>> {
    let hex = hex.trim();
    hex::decode(hex.strip_prefix("0x").unwrap_or(hex)).context("block is not a valid hex string")
}

/// Reads a block file holding either a hex string or the raw serialization
fn read_block_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read block file {}", path.display()))?;
    let decoded = std::str::from_utf8(&bytes).ok().and_then(|text| decode_hex(text).ok());
    Ok(decoded.unwrap_or(bytes))
}

fn print_block(json: bool, block: &Block) -> anyhow::Result<()> {
    let output = BlockOutput {
        summary: block.summary(),
        network: block.network,
        version_bips: block.version_bips(),
        proof_of_work: block.check_proof_of_work(),
    };
    print_one(json, output, |output| {
        let summary = &output.summary;
        let mut lines = vec![
            block.to_string(),
            format!("network       {}", output.network),
            format!("version       {:#010x} {}", summary.version, block.version_bin()),
            format!("prev_block    {}", summary.prev_block),
            format!("merkle_root   {}", summary.merkle_root),
            format!("timestamp     {}", summary.timestamp),
            format!("bits          {:#010x}", summary.bits),
            format!("nonce         {}", summary.nonce),
            format!("target        {}", summary.target),
            format!("difficulty    {}", summary.difficulty),
            format!("proof_of_work {}", output.proof_of_work),
        ];
        if !output.version_bips.is_empty() {
            lines.push(format!("bips          {}", output.version_bips.join(", ")));
        }
        lines.extend(summary.transactions.iter().map(|tx_id| format!("tx            {}", tx_id)));
        lines.join("\n")
    })
}

fn print_one<T: Serialize>(json: bool, data: T, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}
