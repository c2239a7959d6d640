//! On-disk block framing.
//!
//! A block file is a 16-byte header followed by the (optionally compressed)
//! serialized node:
//!
//! ```text
//! 0x00  4   "MFSB" magic
//! 0x04  1   version (u8) = 1
//! 0x05  1   algo: 1=sha2-256, 2=blake3-256
//! 0x06  1   compression: 0=none, 1=zstd
//! 0x07  1   reserved (must be 0)
//! 0x08  8   payload_len (u64 LE) - stored size
//! 0x10  ... payload
//! ```
//!
//! The framing is a storage detail: ids are always computed over the
//! uncompressed node bytes.

use crate::error::{Error, Result};
use crate::hash::Algorithm;

/// Magic bytes at the start of every block file.
pub const MAGIC: &[u8; 4] = b"MFSB";

/// Current block file version.
pub const VERSION: u8 = 1;

/// Size of the block header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Compression threshold: payloads >= 4KB are compressed.
pub const COMPRESSION_THRESHOLD: usize = 4096;

/// Compression types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression.
    None = 0,
    /// Zstandard compression.
    Zstd = 1,
}

impl CompressionType {
    /// Convert to byte representation.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse from byte representation.
    pub fn from_u8(value: u8) -> std::result::Result<Self, String> {
        match value {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Zstd),
            _ => Err(format!("Invalid compression type: {}", value)),
        }
    }
}

/// A 16-byte block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub algorithm: Algorithm,
    pub compression: CompressionType,
    /// Length of the stored payload in bytes (compressed size if compressed).
    pub payload_len: u64,
}

impl BlockHeader {
    /// Encode the header to a 16-byte array.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = VERSION;
        buf[5] = self.algorithm.id();
        buf[6] = self.compression.to_u8();
        buf[8..16].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    /// Decode a header from the start of a block file.
    pub fn decode(buf: &[u8]) -> std::result::Result<Self, String> {
        if buf.len() < HEADER_SIZE {
            return Err(format!(
                "Header too short: {} bytes (expected {})",
                buf.len(),
                HEADER_SIZE
            ));
        }

        if &buf[0..4] != MAGIC {
            return Err(format!(
                "Invalid magic: expected {:?}, got {:?}",
                MAGIC,
                &buf[0..4]
            ));
        }

        if buf[4] != VERSION {
            return Err(format!("Unsupported block version: {}", buf[4]));
        }

        let algorithm = Algorithm::from_id(buf[5]).map_err(|e| e.to_string())?;
        let compression = CompressionType::from_u8(buf[6])?;

        if buf[7] != 0 {
            return Err(format!("Reserved byte must be 0, got {}", buf[7]));
        }

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&buf[8..16]);

        Ok(Self {
            algorithm,
            compression,
            payload_len: u64::from_le_bytes(len_bytes),
        })
    }
}

/// Frame node bytes for storage, compressing large payloads.
pub fn frame(algorithm: Algorithm, data: &[u8]) -> Result<Vec<u8>> {
    let (payload, compression) = if data.len() >= COMPRESSION_THRESHOLD {
        (compress_zstd(data)?, CompressionType::Zstd)
    } else {
        (data.to_vec(), CompressionType::None)
    };

    let header = BlockHeader {
        algorithm,
        compression,
        payload_len: payload.len() as u64,
    };

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Strip the framing from a stored block, returning the node bytes.
pub fn unframe(raw: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let header = BlockHeader::decode(raw)?;
    let payload = &raw[HEADER_SIZE..];

    if payload.len() as u64 != header.payload_len {
        return Err(format!(
            "Payload length mismatch: expected {}, got {}",
            header.payload_len,
            payload.len()
        ));
    }

    match header.compression {
        CompressionType::None => Ok(payload.to_vec()),
        CompressionType::Zstd => {
            zstd::decode_all(payload).map_err(|e| format!("zstd decompression failed: {}", e))
        }
    }
}

/// Compress data using zstd.
fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, 3) // Level 3 = fast compression
        .map_err(|e| Error::store_unavailable(format!("zstd compression failed: {}", e)))
}
