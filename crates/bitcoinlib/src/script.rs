use crate::Error;

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

/// Bitcoin script
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Script {
    pub(crate) bytes: Vec<u8>,
}

impl Script {
    pub fn new() -> Script {
        Self::default()
    }

    /// Builds the block height push a BIP34 coinbase script starts with
    pub fn height(height: u32) -> Script {
        // small heights use the OP_N opcodes, like Bitcoin Core's CScript::push_int64
        match height {
            0 => return Script::from(vec![OP_0]),
            1..=16 => return Script::from(vec![OP_1 + (height as u8 - 1)]),
            _ => {}
        }

        // The format is described here https://github.com/bitcoin/bips/blob/master/bip-0034.mediawiki
        // Tl;dr: first byte is number of bytes in the number, following bytes are little-endian
        // representation of the number
        let mut height_bytes = height.to_le_bytes().to_vec();
        for i in (1..4).rev() {
            // remove trailing zeroes, but always keep first byte even if it's zero
            if height_bytes[i] == 0 {
                height_bytes.remove(i);
            } else {
                break;
            }
        }

        // If the most significant byte is >= 0x80 and the value is positive, push a
        // new zero-byte to make the significant byte < 0x80 again.
        // See https://github.com/bitcoin/bitcoin/blob/b565485c24c0feacae559a7f6f7b83d7516ca58d/src/script/script.h#L360-L373
        if let Some(x) = height_bytes.last() {
            if (x & 0x80) != 0 {
                height_bytes.push(0);
            }
        }

        let mut bytes = vec![height_bytes.len() as u8];
        bytes.extend(height_bytes);
        Script::from(bytes)
    }

    /// Reads the block height from the start of a coinbase script (BIP34)
    pub fn bip34_height(&self) -> Option<u32> {
        let push = *self.bytes.first()?;
        match push {
            OP_0 => Some(0),
            OP_1..=OP_16 => Some((push - OP_1 + 1) as u32),
            1..=4 => {
                let length = push as usize;
                let data = self.bytes.get(1..1 + length)?;
                if data[length - 1] & 0x80 != 0 {
                    // negative numbers are not heights
                    return None;
                }
                let mut height = [0u8; 4];
                height[..length].copy_from_slice(data);
                Some(u32::from_le_bytes(height))
            }
            _ => None,
        }
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Script {
        Script { bytes }
    }
}

impl TryFrom<&str> for Script {
    type Error = Error;

    fn try_from(hex_string: &str) -> Result<Script, Self::Error> {
        let bytes = hex::decode(hex_string).map_err(|_e| Error::MalformedScript)?;
        Ok(Script { bytes })
    }
}

#[test]
fn test_script_height() {
    assert_eq!(Script::height(0).bytes, vec![0x00]);
    assert_eq!(Script::height(7).bytes, vec![0x57]);
    assert_eq!(Script::height(16).bytes, vec![0x60]);
    assert_eq!(Script::height(17).bytes, vec![1, 17]);
    // 2^7 boundary
    assert_eq!(Script::height(127).bytes, vec![1, 127]);
    assert_eq!(Script::height(128).bytes, vec![2, 128, 0]);
    // 2^8 boundary
    assert_eq!(Script::height(255).bytes, vec![2, 0xff, 0x00]);
    assert_eq!(Script::height(256).bytes, vec![2, 0x00, 0x01]);
    // 2^15 boundary
    assert_eq!(Script::height(32767).bytes, vec![2, 0xff, 0x7f]);
    assert_eq!(Script::height(32768).bytes, vec![3, 0x00, 0x80, 0x00]);
    // 2^16 boundary
    assert_eq!(Script::height(65535).bytes, vec![3, 0xff, 0xff, 0x00]);
    assert_eq!(Script::height(65536).bytes, vec![3, 0x00, 0x00, 0x01]);
    assert_eq!(Script::height(500123).bytes, vec![3, 0x9b, 0xa1, 0x07]);
}

#[test]
fn test_script_bip34_height() {
    for height in [0, 1, 16, 17, 127, 128, 255, 256, 32767, 32768, 65535, 65536, 500123, 0x7fffffff] {
        let mut script = Script::height(height);
        script.append(b"/extra nonce/");
        assert_eq!(script.bip34_height(), Some(height));
    }
    assert_eq!(Script::new().bip34_height(), None);
    // push longer than four bytes
    assert_eq!(Script::from(vec![5, 1, 2, 3, 4, 5]).bip34_height(), None);
    // truncated push
    assert_eq!(Script::from(vec![3, 1, 2]).bip34_height(), None);
    // negative number
    assert_eq!(Script::from(vec![1, 0x81]).bip34_height(), None);
}

#[test]
fn test_script_from_hex() {
    let script = Script::try_from("76a914").unwrap();
    assert_eq!(script.as_bytes(), &[0x76, 0xa9, 0x14]);
    assert_eq!(script.as_hex(), "76a914");
    assert_eq!(Script::try_from("7g"), Err(Error::MalformedScript));
}
