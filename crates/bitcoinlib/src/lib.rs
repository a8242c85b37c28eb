//! Parsing, serialization and mining of Bitcoin blocks and transactions.
//!
//! ```
//! use bitcoinlib::{Block, ParseOptions};
//!
//! let raw = hex::decode("0000002083b472f6a12e1ed179608e0de502207aae78a2cd78950f0000000000000000009d8d0f7540e07e014f172cd02aa0154e015e400e4d261420c1534cc2036fe820a4eef05ef2d41117a7ac302f").unwrap();
//! let block = Block::from_raw(&raw, ParseOptions::default()).unwrap();
//! assert!(block.check_proof_of_work());
//! ```

pub mod block;
pub mod error;
pub mod formatter;
pub mod math;
pub mod merkle;
pub mod network;
pub mod parser;
pub mod pow;
pub mod script;
pub mod types;
pub mod utils;

#[cfg(feature = "bitcoin-types-compat")]
pub mod compat;

pub use block::{Block, BlockBuilder, BlockSummary, BlockTransaction, ParseOptions};
pub use error::Error;
pub use formatter::{Formattable, Formatter};
pub use math::{GetCompact, SetCompact};
pub use network::Network;
pub use parser::{parse_transaction, Parsable};
pub use script::Script;
pub use types::{BlockHeader, H256Le, Transaction};
