use crate::{
    block::{Block, ParseOptions},
    formatter::Formattable,
    parser::parse_transaction,
};
pub use rust_bitcoin;
use rust_bitcoin::consensus::{Decodable, Encodable};

#[derive(Debug, PartialEq, Eq)]
pub enum ConversionError {
    ParsingError,
    FormattingError,
}

pub trait ConvertFromBitcoinlib {
    type Output;
    fn to_rust_bitcoin(&self) -> Result<Self::Output, ConversionError>;
}

pub trait ConvertToBitcoinlib {
    type Output;
    fn to_bitcoinlib(&self) -> Result<Self::Output, ConversionError>;
}

/// Macro to implement type conversion to rust-bitcoin, using consensus encoding
macro_rules! impl_to_rust_bitcoin_conversion {
    ($a:path, $b:path) => {
        impl ConvertFromBitcoinlib for $a {
            type Output = $b;
            fn to_rust_bitcoin(&self) -> Result<Self::Output, ConversionError> {
                let bytes = self.format();
                Self::Output::consensus_decode_from_finite_reader(&mut &bytes[..])
                    .map_err(|_| ConversionError::ParsingError)
            }
        }
    };
}

fn consensus_bytes<T: Encodable>(value: &T) -> Result<Vec<u8>, ConversionError> {
    let mut data: Vec<u8> = Vec::new();
    value
        .consensus_encode(&mut data)
        .map_err(|_| ConversionError::FormattingError)?;
    Ok(data)
}

// there also exists rust_bitcoin::Script but we can't convert to that since it's unsized
impl_to_rust_bitcoin_conversion!(crate::Script, rust_bitcoin::ScriptBuf);
impl_to_rust_bitcoin_conversion!(crate::types::Transaction, rust_bitcoin::Transaction);
impl_to_rust_bitcoin_conversion!(crate::types::BlockHeader, rust_bitcoin::block::Header);

impl ConvertToBitcoinlib for rust_bitcoin::Transaction {
    type Output = crate::types::Transaction;
    fn to_bitcoinlib(&self) -> Result<Self::Output, ConversionError> {
        parse_transaction(&consensus_bytes(self)?).map_err(|_| ConversionError::ParsingError)
    }
}

impl ConvertFromBitcoinlib for Block {
    type Output = rust_bitcoin::Block;
    fn to_rust_bitcoin(&self) -> Result<Self::Output, ConversionError> {
        let bytes = self.serialize().map_err(|_| ConversionError::FormattingError)?;
        Self::Output::consensus_decode_from_finite_reader(&mut &bytes[..]).map_err(|_| ConversionError::ParsingError)
    }
}

impl ConvertToBitcoinlib for rust_bitcoin::Block {
    type Output = Block;
    fn to_bitcoinlib(&self) -> Result<Self::Output, ConversionError> {
        let options = ParseOptions {
            parse_transactions: true,
            ..Default::default()
        };
        Block::from_raw(&consensus_bytes(self)?, options).map_err(|_| ConversionError::ParsingError)
    }
}
