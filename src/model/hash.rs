//! Hash value objects and composite `alg:digest` parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hash algorithms with an encoding in the CycloneDX vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Blake3,
}

impl HashAlgorithm {
    /// The wire spelling, e.g. `"SHA-256"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_384 => "SHA3-384",
            Self::Sha3_512 => "SHA3-512",
            Self::Blake2b256 => "BLAKE2b-256",
            Self::Blake2b384 => "BLAKE2b-384",
            Self::Blake2b512 => "BLAKE2b-512",
            Self::Blake3 => "BLAKE3",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    /// Accepts the wire spelling and common prefix forms (`sha256`, `SHA-256`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "SHA3256" => Ok(Self::Sha3_256),
            "SHA3384" => Ok(Self::Sha3_384),
            "SHA3512" => Ok(Self::Sha3_512),
            "BLAKE2B256" => Ok(Self::Blake2b256),
            "BLAKE2B384" => Ok(Self::Blake2b384),
            "BLAKE2B512" => Ok(Self::Blake2b512),
            "BLAKE3" => Ok(Self::Blake3),
            _ => Err(Error::UnknownHashType(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A content digest: algorithm plus hex digest.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hash {
    pub alg: HashAlgorithm,
    pub content: String,
}

impl Hash {
    /// Create a hash from algorithm and hex digest.
    pub fn new(alg: HashAlgorithm, content: impl Into<String>) -> Self {
        Self {
            alg,
            content: content.into(),
        }
    }

    /// Parse a composite `alg:digest` string, e.g. `"sha256:49b8..."`.
    pub fn from_composite_str(composite: &str) -> Result<Self> {
        let (alg, digest) = composite
            .split_once(':')
            .ok_or_else(|| Error::InvalidHashValue(composite.to_string()))?;
        let alg: HashAlgorithm = alg.parse()?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidHashValue(composite.to_string()));
        }
        Ok(Self::new(alg, digest.to_ascii_lowercase()))
    }

    /// SHA-256 digest of a byte stream.
    #[must_use]
    pub fn sha256_of(data: &[u8]) -> Self {
        Self::new(HashAlgorithm::Sha256, crate::utils::hash::sha256_hex(data))
    }
}
