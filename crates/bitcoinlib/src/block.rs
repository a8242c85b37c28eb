//! Bitcoin block parsing and construction.
//!
//! A [`Block`] is read from its raw serialization with [`Block::from_raw`] or assembled from a
//! header and a transaction list with [`Block::new`]. Parsing can be lazy: only the coinbase is
//! decoded up front, the remaining transactions stay raw in `txs_data` until
//! [`Block::parse_transactions`] is called.

use std::fmt;

use log::{debug, warn};
use primitive_types::U256;
use serde::Serialize;

use crate::formatter::Formatter;
use crate::merkle::compute_merkle_root;
use crate::network::Network;
use crate::parser::{parse_transaction_prefix, BytesParser};
use crate::pow;
use crate::script::Script;
use crate::types::*;
use crate::Error;

/// First height at which BIP9 version bits are interpreted
pub const BIP9_ACTIVATION_HEIGHT: u32 = 407021;
/// First height at which unassigned version bits signal version rolling (BIP310)
pub const BIP310_ACTIVATION_HEIGHT: u32 = 500000;

const BIP9_TOP_BITS: u32 = 0b001;
const BIP310_VERSION_MASK: u32 = 0x1fffe000;

/// A transaction of a block, either fully parsed or only known by its id
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum BlockTransaction {
    Parsed(Transaction),
    Id(H256Le),
}

impl BlockTransaction {
    pub fn tx_id(&self) -> H256Le {
        match self {
            BlockTransaction::Parsed(transaction) => transaction.tx_id(),
            BlockTransaction::Id(tx_id) => *tx_id,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            BlockTransaction::Parsed(transaction) => Some(transaction),
            BlockTransaction::Id(_) => None,
        }
    }
}

impl From<Transaction> for BlockTransaction {
    fn from(transaction: Transaction) -> Self {
        BlockTransaction::Parsed(transaction)
    }
}

impl From<H256Le> for BlockTransaction {
    fn from(tx_id: H256Le) -> Self {
        BlockTransaction::Id(tx_id)
    }
}

/// Options for [`Block::from_raw`]
#[derive(Default, Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Expected block hash, parsing fails if the header hashes to something else
    pub block_hash: Option<H256Le>,
    /// Known block height, checked against the BIP34 coinbase height
    pub height: Option<u32>,
    /// Parse all transactions instead of only the coinbase
    pub parse_transactions: bool,
    /// Maximum number of transactions to parse, 0 parses all of them
    pub limit: usize,
    pub network: Network,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    block_hash: H256Le,
    header: BlockHeader,
    pub transactions: Vec<BlockTransaction>,
    /// Serialized transactions which are not parsed yet
    pub txs_data: Vec<u8>,
    pub tx_count: Option<usize>,
    pub height: Option<u32>,
    pub confirmations: Option<u32>,
    pub network: Network,
}

/// Flat, serializable view of a block
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BlockSummary {
    pub block_hash: String,
    pub height: Option<u32>,
    pub version: u32,
    pub prev_block: String,
    pub merkle_root: String,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub target: String,
    pub difficulty: f64,
    pub tx_count: Option<usize>,
    pub transactions: Vec<String>,
    pub confirmations: Option<u32>,
}

impl Block {
    /// Creates a block from its header and transactions.
    ///
    /// For blocks with a version above 1 the height is taken from the coinbase script (BIP34);
    /// a `height` that disagrees with it is rejected.
    pub fn new(
        header: BlockHeader,
        transactions: Vec<BlockTransaction>,
        height: Option<u32>,
        network: Network,
    ) -> Result<Block, Error> {
        let tx_count = if transactions.is_empty() {
            None
        } else {
            Some(transactions.len())
        };
        let mut block = Block {
            block_hash: header.hash(),
            header,
            transactions,
            txs_data: vec![],
            tx_count,
            height,
            confirmations: None,
            network,
        };

        if let Some(calculated) = block.coinbase_height() {
            if let Some(specified) = height {
                if specified != calculated {
                    warn!(
                        "Block {} specifies height {} but its coinbase encodes {}",
                        block.block_hash, specified, calculated
                    );
                    return Err(Error::HeightMismatch);
                }
            }
            block.height = Some(calculated);
        }
        Ok(block)
    }

    /// Parses a serialized block.
    ///
    /// The 80-byte header is always decoded, and so is the coinbase transaction when the block
    /// carries transactions. Other transactions are only parsed if requested in `options`.
    pub fn from_raw(raw: &[u8], options: ParseOptions) -> Result<Block, Error> {
        let raw_header = raw.get(..BLOCK_HEADER_SIZE).ok_or(Error::InvalidHeaderSize)?;
        let header = BlockHeader::from_bytes(raw_header)?;
        let block_hash = header.hash();
        if let Some(expected) = options.block_hash {
            if expected != block_hash {
                warn!(
                    "Provided block hash {} does not correspond to calculated block hash {}",
                    expected, block_hash
                );
                return Err(Error::BlockHashMismatch);
            }
        }

        if raw.len() == BLOCK_HEADER_SIZE {
            debug!("Parsed header-only block {}", block_hash);
            return Block::new(header, vec![], options.height, options.network);
        }

        let mut parser = BytesParser::new(&raw[BLOCK_HEADER_SIZE..]);
        let tx_count: CompactUint = parser.parse()?;
        let tx_count = usize::try_from(tx_count.value).map_err(|_| Error::ArithmeticOverflow)?;
        let mut txs_data = parser.remaining();
        debug!("Parsing block {} with {} transactions", block_hash, tx_count);

        let mut transactions: Vec<BlockTransaction> = vec![];
        // the coinbase is always parsed, it carries the block height
        if !txs_data.is_empty() {
            let (coinbase, size) = parse_transaction_prefix(txs_data)?;
            transactions.push(coinbase.into());
            txs_data = &txs_data[size..];
        }

        while options.parse_transactions && !txs_data.is_empty() {
            if options.limit != 0 && transactions.len() >= options.limit {
                break;
            }
            let (transaction, size) = parse_transaction_prefix(txs_data)?;
            transactions.push(transaction.into());
            txs_data = &txs_data[size..];
        }

        if options.parse_transactions && options.limit == 0 && tx_count != transactions.len() {
            warn!(
                "Number of found transactions {} is not equal to expected number {}",
                transactions.len(),
                tx_count
            );
            return Err(Error::TransactionCountMismatch);
        }

        let mut block = Block::new(header, transactions, options.height, options.network)?;
        block.txs_data = txs_data.to_vec();
        block.tx_count = Some(tx_count);
        Ok(block)
    }

    pub fn with_confirmations(mut self, confirmations: u32) -> Self {
        self.confirmations = Some(confirmations);
        self
    }

    /// Parses up to `limit` transactions (0 for all) from the unparsed transaction data.
    /// Returns the number of transactions parsed.
    pub fn parse_transactions(&mut self, limit: usize) -> Result<usize, Error> {
        let mut parsed = 0;
        let mut position = 0;
        let result = loop {
            if position >= self.txs_data.len() || (limit != 0 && parsed >= limit) {
                break Ok(parsed);
            }
            match parse_transaction_prefix(&self.txs_data[position..]) {
                Ok((transaction, size)) => {
                    self.transactions.push(transaction.into());
                    position += size;
                    parsed += 1;
                }
                Err(err) => break Err(err),
            }
        };
        self.txs_data.drain(..position);
        debug!(
            "Parsed {} transactions of block {}, {} bytes left",
            parsed,
            self.block_hash,
            self.txs_data.len()
        );
        result
    }

    pub fn block_hash(&self) -> H256Le {
        self.block_hash
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn prev_block(&self) -> H256Le {
        self.header.hash_prev_block
    }

    pub fn merkle_root(&self) -> H256Le {
        self.header.merkle_root
    }

    pub fn time(&self) -> u32 {
        self.header.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    pub fn nonce(&self) -> u32 {
        self.header.nonce
    }

    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().and_then(BlockTransaction::as_transaction)
    }

    /// Height encoded in the coinbase script, only meaningful from version 2 on (BIP34)
    fn coinbase_height(&self) -> Option<u32> {
        if self.header.version <= 1 {
            return None;
        }
        let script = &self.coinbase()?.inputs.first()?.script;
        if script.is_empty() {
            return None;
        }
        script.bip34_height()
    }

    /// Block target calculated from the block's bits. The block hash must be below this target.
    pub fn target(&self) -> U256 {
        pow::target_from_bits(self.header.bits)
    }

    /// Block target in hexadecimal string of 64 characters
    pub fn target_hex(&self) -> String {
        pow::target_hex(self.header.bits)
    }

    /// Block difficulty calculated from the target. The genesis block has a difficulty of 1.0
    pub fn difficulty(&self) -> f64 {
        pow::difficulty(self.header.bits)
    }

    pub fn check_proof_of_work(&self) -> bool {
        pow::check_proof_of_work(&self.block_hash, self.header.bits)
    }

    /// Merkle root over the ids of all transactions of the block
    pub fn calculate_merkle_root(&self) -> Result<H256Le, Error> {
        if Some(self.transactions.len()) != self.tx_count {
            return Err(Error::IncorrectTransactionCount);
        }
        let tx_ids: Vec<H256Le> = self.transactions.iter().map(BlockTransaction::tx_id).collect();
        compute_merkle_root(&tx_ids).ok_or(Error::IncorrectTransactionCount)
    }

    pub fn check_merkle_root(&self) -> Result<bool, Error> {
        Ok(self.calculate_merkle_root()? == self.header.merkle_root)
    }

    /// Serializes the block: the 80 byte header followed by all transactions.
    /// Every transaction must be present and parsed.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        if self.transactions.is_empty() || Some(self.transactions.len()) != self.tx_count {
            return Err(Error::IncorrectTransactionCount);
        }
        let mut formatter = Formatter::new();
        formatter.format(self.header);
        formatter.format(CompactUint::from_usize(self.transactions.len()));
        for transaction in self.transactions.iter() {
            let transaction = transaction.as_transaction().ok_or(Error::MissingTransactionData)?;
            formatter.format(transaction);
        }
        Ok(formatter.result())
    }

    /// The block version as a 32 character binary string
    pub fn version_bin(&self) -> String {
        format!("{:032b}", self.header.version)
    }

    /// Protocol changes (BIPs) the miner signals support for in the block version.
    /// Returns nothing when the block height is unknown.
    pub fn version_bips(&self) -> Vec<&'static str> {
        let mut bips = vec![];
        let height = match self.height {
            Some(height) => height,
            None => return bips,
        };
        let version = self.header.version;

        if version >> 29 == BIP9_TOP_BITS && height >= BIP9_ACTIVATION_HEIGHT {
            bips.push("BIP9");
            if version & 1 == 1 {
                bips.push("BIP68"); // BIP112, BIP113 (CSV)
            }
            if (version >> 1) & 1 == 1 {
                bips.push("BIP141"); // BIP143, BIP147 (Segwit)
            }
            if (version >> 4) & 1 == 1 {
                bips.push("BIP91");
            }
            if version == 0x30000000 {
                bips.push("BIP109");
            }
            if version & BIP310_VERSION_MASK != 0 && height >= BIP310_ACTIVATION_HEIGHT {
                bips.push("BIP310"); // version-rolling
            }
        } else if height < BIP310_ACTIVATION_HEIGHT {
            match version {
                2 => bips.push("BIP34"),   // Block height in coinbase
                3 => bips.push("BIP66"),   // Strict DER signatures
                4 => bips.push("BIP65"),   // OP_CHECKLOCKTIMEVERIFY
                0x30000000 => bips.push("BIP109"), // 2MB blocks (rejected)
                0x20000007 => bips.push("BIP101"), // 8MB blocks (rejected)
                _ => {}
            }
        }
        bips
    }

    pub fn summary(&self) -> BlockSummary {
        BlockSummary {
            block_hash: self.block_hash.to_hex_be(),
            height: self.height,
            version: self.header.version,
            prev_block: self.header.hash_prev_block.to_hex_be(),
            merkle_root: self.header.merkle_root.to_hex_be(),
            timestamp: self.header.timestamp,
            bits: self.header.bits,
            nonce: self.header.nonce,
            target: self.target_hex(),
            difficulty: self.difficulty(),
            tx_count: self.tx_count,
            transactions: self
                .transactions
                .iter()
                .map(|transaction| transaction.tx_id().to_hex_be())
                .collect(),
            confirmations: self.confirmations,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Block({}, ", self.block_hash)?;
        match self.height {
            Some(height) => write!(f, "{}", height)?,
            None => write!(f, "None")?,
        }
        match self.tx_count {
            Some(tx_count) => write!(f, ", transactions: {})>", tx_count),
            None => write!(f, ", transactions: None)>"),
        }
    }
}

/// Assembles and mines a block around a BIP34 coinbase transaction
#[derive(Clone, Debug)]
pub struct BlockBuilder {
    version: u32,
    hash_prev_block: H256Le,
    timestamp: u32,
    bits: u32,
    height: u32,
    coinbase_data: Vec<u8>,
    coinbase_output: TransactionOutput,
    transactions: Vec<Transaction>,
    network: Network,
}

impl BlockBuilder {
    /// Starts a version 0x20000000 block at `height`, with the regtest target
    pub fn new(height: u32) -> BlockBuilder {
        BlockBuilder {
            version: 0x20000000,
            hash_prev_block: H256Le::zero(),
            timestamp: 0,
            bits: 0x207fffff,
            height,
            coinbase_data: vec![],
            coinbase_output: TransactionOutput {
                value: 50 * 100_000_000,
                script: Script::new(),
            },
            transactions: vec![],
            network: Network::Regtest,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_previous_hash(mut self, hash_prev_block: H256Le) -> Self {
        self.hash_prev_block = hash_prev_block;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Sets the bits from a full target, rounded down to compact precision
    pub fn with_target(mut self, target: U256) -> Result<Self, Error> {
        self.bits = pow::bits_from_target(target)?;
        Ok(self)
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Extra bytes placed in the coinbase script after the height
    pub fn with_coinbase_data(mut self, data: &[u8]) -> Self {
        self.coinbase_data = data.to_vec();
        self
    }

    pub fn with_coinbase_output(mut self, script: Script, value: i64) -> Self {
        self.coinbase_output = TransactionOutput { value, script };
        self
    }

    pub fn add_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    fn coinbase(&self) -> Transaction {
        let mut script = Script::height(self.height);
        script.append(&self.coinbase_data);
        Transaction {
            version: 1,
            inputs: vec![TransactionInput::coinbase(script)],
            outputs: vec![self.coinbase_output.clone()],
            lock_time: 0,
        }
    }

    /// Computes the merkle root and searches a nonce for which the block hash meets the target
    pub fn mine(self) -> Result<Block, Error> {
        let mut transactions = vec![self.coinbase()];
        transactions.extend(self.transactions.iter().cloned());
        let tx_ids: Vec<H256Le> = transactions.iter().map(Transaction::tx_id).collect();
        let merkle_root = compute_merkle_root(&tx_ids).ok_or(Error::IncorrectTransactionCount)?;

        if pow::target_from_bits(self.bits).is_zero() {
            return Err(Error::NonceExhausted);
        }

        let mut header = BlockHeader {
            version: self.version,
            hash_prev_block: self.hash_prev_block,
            merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
            nonce: 0,
        };
        loop {
            if pow::check_proof_of_work(&header.hash(), header.bits) {
                break;
            }
            header.nonce = header.nonce.checked_add(1).ok_or(Error::NonceExhausted)?;
        }
        debug!("Mined block at height {} with nonce {}", self.height, header.nonce);

        let transactions = transactions.into_iter().map(BlockTransaction::from).collect();
        Block::new(header, transactions, Some(self.height), self.network)
    }
}
