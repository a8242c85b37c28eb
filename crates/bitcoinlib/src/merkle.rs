use crate::types::H256Le;
use crate::utils::sha256d_le;

/// Concatenates and hashes two inputs for merkle proving.
///
/// # Arguments
///
/// * `a` - The first hash
/// * `b` - The second hash
pub fn hash256_merkle_step(a: &[u8], b: &[u8]) -> H256Le {
    let mut res: Vec<u8> = Vec::with_capacity(a.len() + b.len());
    res.extend(a);
    res.extend(b);
    sha256d_le(&res)
}

/// Computes the merkle root of a list of transaction ids. An odd level duplicates its last hash.
/// Returns `None` for an empty list, a block always has at least its coinbase.
pub fn compute_merkle_root(tx_ids: &[H256Le]) -> Option<H256Le> {
    let mut level: Vec<H256Le> = tx_ids.to_vec();
    if level.is_empty() {
        return None;
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0].to_bytes_le();
                let right = pair.get(1).unwrap_or(&pair[0]).to_bytes_le();
                hash256_merkle_step(&left, &right)
            })
            .collect();
    }
    level.first().copied()
}
