use crate::script::Script;
use crate::types::*;
use crate::Error;

/// Type to be parsed from a bytes array
pub trait Parsable: Sized {
    /// Parses a value starting at `position`, returning it with the number of bytes consumed
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(Self, usize), Error>;
}

/// Macro to generate `Parsable` implementation of int types
macro_rules! make_parsable_int {
    ($type:ty, $size:expr) => {
        impl Parsable for $type {
            fn parse(raw_bytes: &[u8], position: usize) -> Result<($type, usize), Error> {
                let slice = raw_bytes.get(position..position + $size).ok_or(Error::EndOfFile)?;
                let mut bytes: [u8; $size] = Default::default();
                bytes.copy_from_slice(slice);
                Ok((<$type>::from_le_bytes(bytes), $size))
            }
        }
    };
}

// Generate parsable implementation for the basic integers (signed and unsgined) types
make_parsable_int!(u8, 1);
make_parsable_int!(u16, 2);
make_parsable_int!(u32, 4);
make_parsable_int!(u64, 8);
make_parsable_int!(i32, 4);
make_parsable_int!(i64, 8);

impl Parsable for H256Le {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(H256Le, usize), Error> {
        let bytes: &[u8; 32] = raw_bytes
            .get(position..position + 32)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(Error::EndOfFile)?;
        Ok((H256Le::from_bytes_le(bytes), 32))
    }
}

impl Parsable for CompactUint {
    // https://github.com/bitcoin/bitcoin/blob/d0f6d9953a15d7c7111d46dcb76ab2bb18e5dee3/src/serialize.h#L319-L348
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(CompactUint, usize), Error> {
        let (value, consumed, minimum) = match *raw_bytes.get(position).ok_or(Error::EndOfFile)? {
            0xfd => {
                let (value, _) = u16::parse(raw_bytes, position + 1)?;
                (value as u64, 3, 0xfd)
            }
            0xfe => {
                let (value, _) = u32::parse(raw_bytes, position + 1)?;
                (value as u64, 5, 0x1_0000)
            }
            0xff => {
                let (value, _) = u64::parse(raw_bytes, position + 1)?;
                (value, 9, 0x1_0000_0000)
            }
            n => (n as u64, 1, 0),
        };
        // values must use their shortest encoding
        if value < minimum {
            return Err(Error::NonCanonicalVarint);
        }
        Ok((CompactUint { value }, consumed))
    }
}

/// Vectors are prefixed by their length as a `CompactUint`
impl<T: Parsable> Parsable for Vec<T> {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(Vec<T>, usize), Error> {
        let mut parser = BytesParser::new(raw_bytes);
        parser.position = position;
        let count: CompactUint = parser.parse()?;
        // every element takes at least one byte, so an absurd count fails on EndOfFile
        let mut result = Vec::new();
        for _ in 0..count.value {
            result.push(parser.parse()?);
        }
        Ok((result, parser.position - position))
    }
}

impl Parsable for Script {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(Script, usize), Error> {
        let mut parser = BytesParser::new(raw_bytes);
        parser.position = position;
        let length: CompactUint = parser.parse()?;
        let length = usize::try_from(length.value).map_err(|_| Error::EndOfFile)?;
        let bytes = parser.read(length)?;
        Ok((Script::from(bytes.to_vec()), parser.position - position))
    }
}

impl Parsable for BlockHeader {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(BlockHeader, usize), Error> {
        let slice = raw_bytes
            .get(position..position + BLOCK_HEADER_SIZE)
            .ok_or(Error::InvalidHeaderSize)?;
        let mut parser = BytesParser::new(slice);
        let header = BlockHeader {
            version: parser.parse()?,
            hash_prev_block: parser.parse()?,
            merkle_root: parser.parse()?,
            timestamp: parser.parse()?,
            bits: parser.parse()?,
            nonce: parser.parse()?,
        };
        Ok((header, BLOCK_HEADER_SIZE))
    }
}

impl Parsable for TransactionInput {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(TransactionInput, usize), Error> {
        let mut parser = BytesParser::new(raw_bytes);
        parser.position = position;
        let input = TransactionInput {
            previous_hash: parser.parse()?,
            previous_index: parser.parse()?,
            script: parser.parse()?,
            sequence: parser.parse()?,
            witness: vec![],
        };
        Ok((input, parser.position - position))
    }
}

impl Parsable for TransactionOutput {
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(TransactionOutput, usize), Error> {
        let mut parser = BytesParser::new(raw_bytes);
        parser.position = position;
        let output = TransactionOutput {
            value: parser.parse()?,
            script: parser.parse()?,
        };
        Ok((output, parser.position - position))
    }
}

impl Parsable for Transaction {
    // https://github.com/bitcoin/bitcoin/blob/d0f6d9953a15d7c7111d46dcb76ab2bb18e5dee3/src/primitives/transaction.h#L196-L240
    fn parse(raw_bytes: &[u8], position: usize) -> Result<(Transaction, usize), Error> {
        let mut parser = BytesParser::new(raw_bytes);
        parser.position = position;

        let version: i32 = parser.parse()?;

        let mut flags: u8 = 0;
        let mut inputs: Vec<TransactionInput> = parser.parse()?;
        let outputs: Vec<TransactionOutput>;
        if inputs.is_empty() {
            // an empty input list is the segwit marker, followed by the flag byte
            flags = parser.parse()?;
            if flags != 0 {
                inputs = parser.parse()?;
                outputs = parser.parse()?;
            } else {
                outputs = vec![];
            }
        } else {
            outputs = parser.parse()?;
        }

        if (flags & 1) != 0 {
            flags ^= 1;
            for input in inputs.iter_mut() {
                input.with_witness(parser.parse()?);
            }
            if !inputs.iter().any(|input| !input.witness.is_empty()) {
                // superfluous witness record
                return Err(Error::MalformedTransaction);
            }
        }

        if flags != 0 {
            // unknown optional data
            return Err(Error::MalformedTransaction);
        }

        let lock_time: u32 = parser.parse()?;

        let transaction = Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        };
        Ok((transaction, parser.position - position))
    }
}

/// Cursor over a bytes slice, yielding `Parsable` values
pub struct BytesParser<'a> {
    raw_bytes: &'a [u8],
    position: usize,
}

impl<'a> BytesParser<'a> {
    /// Creates a new `BytesParser` to parse the given bytes
    pub fn new(bytes: &'a [u8]) -> BytesParser<'a> {
        BytesParser {
            raw_bytes: bytes,
            position: 0,
        }
    }

    /// Parses a value and advances past its encoding
    pub fn parse<T: Parsable>(&mut self) -> Result<T, Error> {
        let (result, bytes_consumed) = T::parse(self.raw_bytes, self.position)?;
        self.position += bytes_consumed;
        Ok(result)
    }

    /// Returns the next `count` raw bytes
    pub fn read(&mut self, count: usize) -> Result<&'a [u8], Error> {
        let end = self.position.checked_add(count).ok_or(Error::EndOfFile)?;
        let result = self.raw_bytes.get(self.position..end).ok_or(Error::EndOfFile)?;
        self.position = end;
        Ok(result)
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.raw_bytes[self.position.min(self.raw_bytes.len())..]
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.raw_bytes.len()
    }
}

/// Parses the first transaction of `raw_transaction`, returning it with its serialized size.
/// Trailing bytes are left untouched so concatenated transactions can be walked.
pub fn parse_transaction_prefix(raw_transaction: &[u8]) -> Result<(Transaction, usize), Error> {
    Transaction::parse(raw_transaction, 0)
}

/// Parses a bitcoin transaction which must span the whole slice
///
/// # Arguments
///
/// * `raw_transaction` - the raw bytes of the transaction
pub fn parse_transaction(raw_transaction: &[u8]) -> Result<Transaction, Error> {
    let (transaction, size) = parse_transaction_prefix(raw_transaction)?;
    if size != raw_transaction.len() {
        return Err(Error::MalformedTransaction);
    }
    Ok(transaction)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_block_header() -> &'static str {
        // example from https://bitcoin.org/en/developer-reference#block-headers
        concat!(
            "02000000",                                                         // Block version: 2
            "b6ff0b1b1680a2862a30ca44d346d9e8910d334beb48ca0c0000000000000000", // Hash of previous block's header
            "9d10aa52ee949386ca9385695f04ede270dda20810decd12bc9b048aaab31471", // Merkle root
            "24d95a54",                                                         // Unix time: 1415239972
            "30c31b18",                                                         // Target: 0x1bc330 * 256**(0x18-3)
            "fe9f0864",                                                         // Nonce
        )
    }

    pub(crate) fn sample_transaction_input() -> &'static str {
        concat!(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f", // Previous output hash
            "01000000",                                                         // Previous output index
            "00",                                                               // Empty script
            "feffffff",                                                         // Sequence
        )
    }

    pub(crate) fn sample_transaction_output() -> &'static str {
        concat!(
            "a086010000000000",                                   // Value: 100000 satoshis
            "19",                                                 // Script length
            "76a914111111111111111111111111111111111111111188ac", // P2PKH script
        )
    }

    pub(crate) fn sample_transaction() -> String {
        "02000000".to_string() + // Version
        "01" + // Inputs count
        sample_transaction_input() +
        "01" + // Outputs count
        sample_transaction_output() +
        "9aa10700" // Lock time: 500122
    }

    // txid eb3db053cd139147f2fd676cf59a491fd5aebc54bddfde829704585b659126fc
    pub(crate) fn sample_extended_transaction() -> &'static str {
        "0100000000010120e6fb8f0e2cfb8667a140a92d045d5db7c1b56635790bc907c3e71d43720a150e00000017160014641e441c2ba32dd7cf05afde7922144dd106b09bffffffff019dbd54000000000017a914bd847a4912984cf6152547feca51c1b9c2bcbe2787024830450221008f00033064c26cfca4dc98e5dba800b18729c3441dca37b49358ae0df9be7fad02202a81085318466ea66ef390d5dab6737e44a05f7f2e747932ebba917e0098f37d012102c109fc47335c3a2e206d462ad52590b1842aa9d6e0eb9c683c896fa8723590b400000000"
    }

    #[test]
    fn test_parse_block_header() {
        let raw_header = hex::decode(sample_block_header()).unwrap();
        let parsed_header = BlockHeader::from_bytes(&raw_header).unwrap();
        assert_eq!(parsed_header.version, 2);
        assert_eq!(parsed_header.timestamp, 1415239972);
        assert_eq!(parsed_header.bits, 0x181bc330);
        assert_eq!(parsed_header.nonce, 0x64089ffe);
        assert_eq!(
            format!("{}", parsed_header.merkle_root),
            "7114b3aa8a049bbc12cdde1008a2dd70e2ed045f698593ca869394ee52aa109d"
        );
        assert_eq!(
            format!("{}", parsed_header.hash_prev_block),
            "00000000000000000cca48eb4b330d91e8d946d344ca302a86a280161b0bffb6"
        );
    }

    #[test]
    fn test_parse_block_header_wrong_size() {
        let raw_header = hex::decode(sample_block_header()).unwrap();
        assert_eq!(BlockHeader::from_bytes(&raw_header[..79]), Err(Error::InvalidHeaderSize));
        assert_eq!(BlockHeader::from_bytes(&[0; 81]), Err(Error::InvalidHeaderSize));
    }

    #[test]
    fn test_parse_compact_uint() {
        let cases = [
            (&[1, 2, 3][..], (1, 1)),
            (&[253, 2, 3][..], (770, 3)),
            (&[254, 2, 3, 8, 1, 8][..], (17302274, 5)),
            (&[255, 6, 0xa, 3, 8, 1, 0xb, 2, 7, 8][..], (504978207276206598, 9)),
        ];
        for (input, (value, size)) in cases.iter() {
            let (parsed, consumed) = CompactUint::parse(input, 0).unwrap();
            assert_eq!(parsed.value, *value);
            assert_eq!(consumed, *size);
        }
        assert_eq!(CompactUint::parse(&[253, 2], 0), Err(Error::EndOfFile));
        assert_eq!(CompactUint::parse(&[], 0), Err(Error::EndOfFile));
    }

    #[test]
    fn test_parse_non_canonical_compact_uint() {
        let cases = [
            &[253, 1, 0][..],
            &[253, 252, 0][..],
            &[254, 255, 255, 0, 0][..],
            &[255, 255, 255, 255, 255, 0, 0, 0, 0][..],
        ];
        for input in cases.iter() {
            assert_eq!(CompactUint::parse(input, 0), Err(Error::NonCanonicalVarint));
        }
        assert_eq!(CompactUint::parse(&[253, 253, 0], 0), Ok((CompactUint { value: 253 }, 3)));
        assert_eq!(CompactUint::parse(&[254, 0, 0, 1, 0], 0), Ok((CompactUint { value: 0x10000 }, 5)));

        // input count 1 encoded in three bytes
        let raw_tx = "02000000".to_string() + "fd0100" + sample_transaction_input() + "01" + sample_transaction_output() + "9aa10700";
        let raw_tx = hex::decode(raw_tx).unwrap();
        assert_eq!(parse_transaction(&raw_tx), Err(Error::NonCanonicalVarint));
    }

    #[test]
    fn test_parse_transaction_input() {
        let raw_input = hex::decode(sample_transaction_input()).unwrap();
        let mut parser = BytesParser::new(&raw_input);
        let input: TransactionInput = parser.parse().unwrap();
        assert_eq!(input.previous_index, 1);
        assert_eq!(input.previous_hash.to_bytes_le()[31], 0x1f);
        assert!(input.script.is_empty());
        assert_eq!(input.sequence, 0xfffffffe);
        assert!(!input.is_coinbase());
        assert!(parser.is_empty());
    }

    #[test]
    fn test_parse_transaction_output() {
        let raw_output = hex::decode(sample_transaction_output()).unwrap();
        let mut parser = BytesParser::new(&raw_output);
        let output: TransactionOutput = parser.parse().unwrap();
        assert_eq!(output.value, 100000);
        assert_eq!(
            output.script.as_hex(),
            "76a914111111111111111111111111111111111111111188ac"
        );
    }

    #[test]
    fn test_parse_transaction() {
        let raw_tx = hex::decode(sample_transaction()).unwrap();
        let tx = parse_transaction(&raw_tx).unwrap();
        assert_eq!(tx.version, 2);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.lock_time, 500122);
        assert!(!tx.has_witness());
        assert_eq!(
            tx.tx_id(),
            H256Le::from_hex_be("8bd5230c104b180b848bc06e6a4281b2bfd5eb84f1d6b087e2231ad9b88ec521").unwrap()
        );
        // without witness data, txid and wtxid coincide
        assert_eq!(tx.tx_id(), tx.hash());
    }

    #[test]
    fn test_parse_extended_transaction() {
        let raw_tx = hex::decode(sample_extended_transaction()).unwrap();
        let tx = parse_transaction(&raw_tx).unwrap();
        assert_eq!(tx.version, 1);
        assert!(tx.has_witness());
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].witness.len(), 2);
        assert_eq!(tx.inputs[0].witness[1].len(), 33);
        assert_eq!(tx.outputs[0].value, 5553565);
    }

    #[test]
    fn test_parse_extended_transaction_with_high_version_bits() {
        use crate::formatter::Formattable;

        let mut raw_tx = hex::decode(sample_extended_transaction()).unwrap();
        raw_tx[..4].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        let tx = parse_transaction(&raw_tx).unwrap();
        assert_eq!(tx.version, -1);
        assert!(tx.has_witness());
        assert_eq!(tx.inputs[0].witness.len(), 2);
        assert_eq!(tx.format(), raw_tx);
        assert_ne!(tx.tx_id(), tx.hash());
    }

    #[test]
    fn test_parse_transaction_prefix_leaves_trailing_bytes() {
        let mut raw = hex::decode(sample_transaction()).unwrap();
        let tx_len = raw.len();
        raw.extend(hex::decode(sample_extended_transaction()).unwrap());

        let (first, size) = parse_transaction_prefix(&raw).unwrap();
        assert_eq!(size, tx_len);
        assert_eq!(first.version, 2);
        let (second, size) = parse_transaction_prefix(&raw[tx_len..]).unwrap();
        assert_eq!(size, raw.len() - tx_len);
        assert!(second.has_witness());

        assert_eq!(parse_transaction(&raw), Err(Error::MalformedTransaction));
    }

    #[test]
    fn test_parse_truncated_transaction() {
        let raw_tx = hex::decode(sample_extended_transaction()).unwrap();
        for len in [0, 4, 6, 50, raw_tx.len() - 1] {
            assert_eq!(parse_transaction(&raw_tx[..len]), Err(Error::EndOfFile));
        }
    }

    #[test]
    fn test_parse_superfluous_witness_flag() {
        // version, marker, flag, one input without witness data, one output, lock time
        let raw_tx = "02000000".to_string() + "0001" + "01" + sample_transaction_input() + "01" + sample_transaction_output() + "00" + "00000000";
        let raw_tx = hex::decode(raw_tx).unwrap();
        assert_eq!(parse_transaction(&raw_tx), Err(Error::MalformedTransaction));
    }
}
