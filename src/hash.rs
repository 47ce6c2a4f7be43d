// Hashing helpers
// Keccak-256 over UTF-8 text, hex encoded without a 0x prefix

use sha3::{Digest, Keccak256};

/// Keccak-256 of `input`, as lowercase hex without `0x`
pub fn keccak256(input: &str) -> String {
    hex::encode(Keccak256::digest(input.as_bytes()))
}

/// Alias for [`keccak256`]
pub fn hash(input: &str) -> String {
    keccak256(input)
}
