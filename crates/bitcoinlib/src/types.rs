use std::fmt;

use codec::{Decode, Encode, MaxEncodedLen};
use primitive_types::U256;
use scale_info::TypeInfo;

use crate::formatter::{Formattable, Formatter};
use crate::parser::{parse_transaction, BytesParser};
use crate::script::Script;
use crate::utils::*;
use crate::Error;

pub const BLOCK_HEADER_SIZE: usize = 80;

/// Represents a bitcoin 32 bytes hash digest encoded in little-endian
#[derive(Encode, Decode, TypeInfo, MaxEncodedLen, Default, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct H256Le {
    content: [u8; 32],
}

impl H256Le {
    /// Creates a new H256Le hash equals to zero
    pub fn zero() -> H256Le {
        H256Le { content: [0; 32] }
    }

    pub fn is_zero(&self) -> bool {
        self.content == [0; 32]
    }

    /// Creates a H256Le from little endian bytes
    pub fn from_bytes_le(bytes: &[u8; 32]) -> H256Le {
        H256Le { content: *bytes }
    }

    /// Creates a H256Le from big endian bytes
    pub fn from_bytes_be(bytes: &[u8; 32]) -> H256Le {
        let mut content = *bytes;
        content.reverse();
        H256Le { content }
    }

    pub fn from_hex_le(hex: &str) -> Result<H256Le, Error> {
        Ok(H256Le::from_bytes_le(&Self::decode_hash_hex(hex)?))
    }

    /// Parses the usual display form of a bitcoin hash, e.g. a block hash from an explorer
    pub fn from_hex_be(hex: &str) -> Result<H256Le, Error> {
        Ok(H256Le::from_bytes_be(&Self::decode_hash_hex(hex)?))
    }

    fn decode_hash_hex(hex: &str) -> Result<[u8; 32], Error> {
        let bytes = hex::decode(hex.trim_start_matches("0x")).map_err(|_| Error::InvalidHex)?;
        bytes.try_into().map_err(|_| Error::InvalidHex)
    }

    /// Returns the content of the H256Le encoded in big endian
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut content: [u8; 32] = Default::default();
        content.copy_from_slice(&reverse_endianness(&self.content[..]));
        content
    }

    /// Returns the content of the H256Le encoded in little endian
    pub fn to_bytes_le(&self) -> [u8; 32] {
        self.content
    }

    /// Returns the content of the H256Le encoded in little endian hex
    pub fn to_hex_le(&self) -> String {
        hex::encode(self.to_bytes_le())
    }

    /// Returns the content of the H256Le encoded in big endian hex
    pub fn to_hex_be(&self) -> String {
        hex::encode(self.to_bytes_be())
    }

    /// Returns the value as a U256
    pub fn as_u256(&self) -> U256 {
        U256::from_little_endian(&self.to_bytes_le())
    }
}

impl fmt::Display for H256Le {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_be())
    }
}

impl fmt::LowerHex for H256Le {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_be())
    }
}

/// Bitcoin variable length integer
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct CompactUint {
    pub value: u64,
}

impl CompactUint {
    pub fn from_usize(value: usize) -> CompactUint {
        CompactUint { value: value as u64 }
    }
}

/// Bitcoin block header, the first 80 bytes of a serialized block
#[derive(Encode, Decode, TypeInfo, MaxEncodedLen, Default, Copy, Clone, PartialEq, Eq, Debug)]
pub struct BlockHeader {
    pub version: u32,
    pub hash_prev_block: H256Le,
    pub merkle_root: H256Le,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Parses an 80-byte serialized block header
    pub fn from_bytes(bytes: &[u8]) -> Result<BlockHeader, Error> {
        if bytes.len() != BLOCK_HEADER_SIZE {
            return Err(Error::InvalidHeaderSize);
        }
        let mut parser = BytesParser::new(bytes);
        parser.parse()
    }

    pub fn from_hex<T: AsRef<[u8]>>(hex_string: T) -> Result<BlockHeader, Error> {
        let bytes = hex::decode(hex_string).map_err(|_e| Error::MalformedHeader)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the hash of the block header using Bitcoin's double sha256
    pub fn hash(&self) -> H256Le {
        sha256d_le(&self.format())
    }
}

/// Bitcoin transaction input
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TransactionInput {
    pub previous_hash: H256Le,
    pub previous_index: u32,
    pub script: Script,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    pub fn coinbase(script: Script) -> TransactionInput {
        TransactionInput {
            previous_hash: H256Le::zero(),
            previous_index: u32::MAX,
            script,
            sequence: u32::MAX,
            witness: vec![],
        }
    }

    /// Coinbase inputs spend the null outpoint
    pub fn is_coinbase(&self) -> bool {
        self.previous_hash.is_zero() && self.previous_index == u32::MAX
    }

    pub fn with_witness(&mut self, witness: Vec<Vec<u8>>) {
        self.witness = witness;
    }
}

/// Bitcoin transaction output
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TransactionOutput {
    pub value: i64,
    pub script: Script,
}

/// Bitcoin transaction
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn from_hex<T: AsRef<[u8]>>(hex_string: T) -> Result<Transaction, Error> {
        let bytes = hex::decode(hex_string).map_err(|_e| Error::InvalidHex)?;
        parse_transaction(&bytes)
    }

    /// Transaction id, hashed without witness data
    pub fn tx_id(&self) -> H256Le {
        sha256d_le(&self.format_with(false))
    }

    /// Witness transaction id
    pub fn hash(&self) -> H256Le {
        sha256d_le(&self.format())
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }

    /// Size of the serialized transaction, including witness data
    pub fn size(&self) -> usize {
        self.format().len()
    }

    /// Serializes the transaction, with or without witness data
    pub fn format_with(&self, witness: bool) -> Vec<u8> {
        let mut formatter = Formatter::new();
        self.format_transaction_into(&mut formatter, witness);
        formatter.result()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.format())
    }
}
