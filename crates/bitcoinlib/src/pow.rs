use primitive_types::U256;

use crate::math::{u256_to_f64, GetCompact, SetCompact};
use crate::types::H256Le;
use crate::Error;

/// Compact bits of the difficulty 1 target, used by the genesis block
// https://github.com/bitcoin/bitcoin/blob/5ba5becbb5d8c794efe579caeea7eea64f895a13/src/chainparams.cpp#L128
pub const DIFFICULTY_1_BITS: u32 = 0x1d00ffff;

/// Decodes compact bits into the target a block hash must stay below.
/// Zero bits and negative or overflowing encodings have a zero target.
pub fn target_from_bits(bits: u32) -> U256 {
    if bits == 0 {
        return U256::zero();
    }
    U256::set_compact(bits).unwrap_or_else(U256::zero)
}

/// Encodes a target as compact bits. Precision beyond the 23 bit mantissa is dropped.
pub fn bits_from_target(target: U256) -> Result<u32, Error> {
    if target.is_zero() {
        return Err(Error::InvalidCompact);
    }
    target.get_compact().ok_or(Error::InvalidCompact)
}

/// Target as 64 hexadecimal characters, empty when there are no bits
pub fn target_hex(bits: u32) -> String {
    if bits == 0 {
        return String::new();
    }
    let mut bytes = [0u8; 32];
    target_from_bits(bits).to_big_endian(&mut bytes);
    hex::encode(bytes)
}

/// Human readable representation of the target: how many times harder than difficulty 1
pub fn difficulty(bits: u32) -> f64 {
    let target = target_from_bits(bits);
    if target.is_zero() {
        return 0.0;
    }
    u256_to_f64(target_from_bits(DIFFICULTY_1_BITS)) / u256_to_f64(target)
}

/// A hash satisfies the proof of work when, read as a number, it is below the target
pub fn check_proof_of_work(hash: &H256Le, bits: u32) -> bool {
    let target = target_from_bits(bits);
    !target.is_zero() && hash.as_u256() < target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target() {
        assert_eq!(
            target_hex(0x1711d4f2),
            "00000000000000000011d4f20000000000000000000000000000000000000000"
        );
        assert_eq!(
            target_hex(DIFFICULTY_1_BITS),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(target_hex(0), "");
        // taken from https://bitcoin.org/en/developer-reference#block-headers
        assert_eq!(
            target_from_bits(0x181bc330),
            U256::from_dec_str("680733321990486529407107157001552378184394215934016880640").unwrap()
        );
        // negative
        assert_eq!(target_from_bits(0x04923456), U256::zero());
    }

    #[test]
    fn test_bits_from_target() {
        assert_eq!(bits_from_target(target_from_bits(DIFFICULTY_1_BITS)), Ok(DIFFICULTY_1_BITS));
        assert_eq!(bits_from_target(target_from_bits(0x207fffff)), Ok(0x207fffff));
        assert_eq!(bits_from_target(U256::from(0xffffu64) << 208 | U256::one()), Ok(DIFFICULTY_1_BITS));
        assert_eq!(bits_from_target(U256::zero()), Err(Error::InvalidCompact));
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(difficulty(DIFFICULTY_1_BITS), 1.0);
        assert_eq!(difficulty(0), 0.0);
        let expected = 15784744305477.408;
        assert!((difficulty(0x1711d4f2) - expected).abs() / expected < 1e-12);
        // regtest
        assert!((difficulty(0x207fffff) - 4.6565423739069247e-10).abs() < 1e-20);
    }

    #[test]
    fn test_check_proof_of_work() {
        let hash = H256Le::from_hex_be("0000000000000000000154ba9d02ddd6cee0d71d1ea232753e02c9ac6affd709").unwrap();
        assert!(check_proof_of_work(&hash, 0x1711d4f2));
        assert!(!check_proof_of_work(&hash, 0x1600ffff));
        assert!(!check_proof_of_work(&hash, 0));
    }
}
