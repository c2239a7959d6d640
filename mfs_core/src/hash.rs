//! Hash algorithms and content identifiers.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Digest size in bytes (both supported algorithms produce 256-bit digests).
pub const DIGEST_SIZE: usize = 32;

/// Encoded size of a content id: version byte, algorithm byte, digest.
pub const ID_SIZE: usize = DIGEST_SIZE + 2;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// SHA2 with 256-bit output.
    #[default]
    Sha2_256,
    /// BLAKE3 with 256-bit output.
    Blake3,
}

impl Algorithm {
    /// Returns the string representation of the algorithm (for config files).
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha2_256 => "sha2-256",
            Algorithm::Blake3 => "blake3-256",
        }
    }

    /// Parse algorithm from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "sha2-256" => Ok(Algorithm::Sha2_256),
            "blake3-256" | "blake3" => Ok(Algorithm::Blake3),
            _ => Err(Error::unsupported_algorithm(s)),
        }
    }

    /// Returns the algorithm ID byte (for encoded ids and block headers).
    pub fn id(&self) -> u8 {
        match self {
            Algorithm::Sha2_256 => 1,
            Algorithm::Blake3 => 2,
        }
    }

    /// Parse algorithm from ID byte.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Algorithm::Sha2_256),
            2 => Ok(Algorithm::Blake3),
            _ => Err(Error::unsupported_algorithm(format!("ID {}", id))),
        }
    }

    /// Digest raw bytes with this algorithm.
    pub fn digest(&self, data: &[u8]) -> [u8; DIGEST_SIZE] {
        match self {
            Algorithm::Sha2_256 => Sha256::digest(data).into(),
            Algorithm::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }
}

/// Content id version.
///
/// Version 0 ids are always `sha2-256`; version 1 ids may use any algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CidVersion {
    #[default]
    V0,
    V1,
}

impl CidVersion {
    pub fn as_u8(self) -> u8 {
        match self {
            CidVersion::V0 => 0,
            CidVersion::V1 => 1,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CidVersion::V0),
            1 => Ok(CidVersion::V1),
            _ => Err(Error::invalid_params(format!(
                "Unsupported id version: {}",
                value
            ))),
        }
    }

    /// Check that `algorithm` may be used with this version.
    pub fn check(self, algorithm: Algorithm) -> Result<()> {
        if self == CidVersion::V0 && algorithm != Algorithm::Sha2_256 {
            return Err(Error::invalid_params(format!(
                "id version 0 requires sha2-256, got {}",
                algorithm.as_str()
            )));
        }
        Ok(())
    }
}

/// Identity of a serialized node: hash of its bytes plus the hashing config.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId {
    version: u8,
    algorithm: u8,
    digest: [u8; DIGEST_SIZE],
}

impl ContentId {
    /// Compute the id of `data` under the given algorithm and version.
    pub fn compute(data: &[u8], algorithm: Algorithm, version: CidVersion) -> Result<Self> {
        version.check(algorithm)?;
        Ok(Self {
            version: version.as_u8(),
            algorithm: algorithm.id(),
            digest: algorithm.digest(data),
        })
    }

    /// Parse the fixed-size binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ID_SIZE {
            return Err(Error::invalid_params(format!(
                "Expected {} id bytes, got {}",
                ID_SIZE,
                bytes.len()
            )));
        }
        let version = CidVersion::from_u8(bytes[0])?;
        let algorithm = Algorithm::from_id(bytes[1])?;
        version.check(algorithm)?;

        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&bytes[2..]);
        Ok(Self {
            version: version.as_u8(),
            algorithm: algorithm.id(),
            digest,
        })
    }

    /// Binary form: version byte, algorithm byte, digest.
    pub fn to_bytes(&self) -> [u8; ID_SIZE] {
        let mut buf = [0u8; ID_SIZE];
        buf[0] = self.version;
        buf[1] = self.algorithm;
        buf[2..].copy_from_slice(&self.digest);
        buf
    }

    /// Create an id from a hex string (68 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != ID_SIZE * 2 {
            return Err(Error::invalid_params(format!(
                "Expected {} hex characters, got {}",
                ID_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::invalid_params(format!("Invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Get the first 2 hex characters of the digest (for directory sharding on disk).
    pub fn prefix(&self) -> String {
        hex::encode(&self.digest[..1])
    }

    /// The remaining hex characters (for the block filename).
    pub fn suffix(&self) -> String {
        let bytes = self.to_bytes();
        format!("{}{}", hex::encode(&bytes[..2]), hex::encode(&self.digest[1..]))
    }

    pub fn version(&self) -> CidVersion {
        // Constructors validate the version byte.
        if self.version == 0 {
            CidVersion::V0
        } else {
            CidVersion::V1
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        // Constructors validate the algorithm byte.
        if self.algorithm == Algorithm::Blake3.id() {
            Algorithm::Blake3
        } else {
            Algorithm::Sha2_256
        }
    }

    /// Get the raw digest bytes.
    pub fn digest(&self) -> &[u8; DIGEST_SIZE] {
        &self.digest
    }

    /// Check that `data` hashes to this id.
    pub fn verify(&self, data: &[u8]) -> bool {
        self.algorithm().digest(data) == self.digest
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.to_hex())
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
