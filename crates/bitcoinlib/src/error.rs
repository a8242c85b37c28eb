use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    EndOfFile,
    MalformedHeader,
    InvalidHeaderSize,
    NonCanonicalVarint,
    MalformedTransaction,
    MalformedScript,
    InvalidHex,
    InvalidCompact,
    BlockHashMismatch,
    TransactionCountMismatch,
    HeightMismatch,
    IncorrectTransactionCount,
    MissingTransactionData,
    NonceExhausted,
    UnknownNetwork,
    ArithmeticOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Error::EndOfFile => "unexpected end of data",
            Error::MalformedHeader => "malformed block header",
            Error::InvalidHeaderSize => "block header must be 80 bytes",
            Error::NonCanonicalVarint => "non-canonical variable length integer",
            Error::MalformedTransaction => "malformed transaction",
            Error::MalformedScript => "malformed script",
            Error::InvalidHex => "invalid hex string",
            Error::InvalidCompact => "target can not be encoded as compact bits",
            Error::BlockHashMismatch => "provided block hash does not match calculated block hash",
            Error::TransactionCountMismatch => "number of parsed transactions differs from block transaction count",
            Error::HeightMismatch => "specified block height differs from BIP34 coinbase height",
            Error::IncorrectTransactionCount => "block contains incorrect number of transactions, can not serialize",
            Error::MissingTransactionData => "block contains transaction ids without transaction data",
            Error::NonceExhausted => "no nonce satisfies the block target",
            Error::UnknownNetwork => "unknown network",
            Error::ArithmeticOverflow => "arithmetic overflow",
        };
        f.write_str(message)
    }
}

impl std::error::Error for Error {}
