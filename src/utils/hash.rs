//! Hashing helpers: fast in-process fingerprints and cryptographic digests.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_64;

/// Fast non-cryptographic fingerprint for change detection.
#[must_use]
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Lowercase hex SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
