//! Binary node format.
//!
//! Every node is serialized with a 16-byte header followed by the body:
//!
//! ```text
//! 0x00  4   "MFSN" magic
//! 0x04  1   format version (u8) = 1
//! 0x05  1   kind: 1=file, 2=directory, 3=shard
//! 0x06  1   shard depth (0 unless kind=shard)
//! 0x07  1   reserved (must be 0)
//! 0x08  8   body_len (u64 LE)
//! 0x10  ... body
//! ```
//!
//! Bodies:
//! - file: raw data
//! - directory: links sorted by name (see [`Link::encode`])
//! - shard: slots sorted by index; each is `index u8, tag u8` followed by a
//!   link (tag 1) or a 34-byte id and u64 LE size (tag 2)
//!
//! The id of a node is the hash of these exact bytes.

use crate::error::{Error, Result};
use crate::hash::{Algorithm, CidVersion, ContentId};
use crate::node::{DagNode, Link, ShardNode, Slot, decode_id_size};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

/// Magic bytes at the start of every serialized node.
pub const MAGIC: &[u8; 4] = b"MFSN";

/// Current node format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the node header in bytes.
pub const HEADER_SIZE: usize = 16;

const KIND_FILE: u8 = 1;
const KIND_DIRECTORY: u8 = 2;
const KIND_SHARD: u8 = 3;

const SLOT_ENTRY: u8 = 1;
const SLOT_CHILD: u8 = 2;

/// Hashing configuration applied when computing a node's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HashConfig {
    pub hash_alg: Algorithm,
    pub cid_version: CidVersion,
}

impl HashConfig {
    pub fn new(hash_alg: Algorithm, cid_version: CidVersion) -> Result<Self> {
        cid_version.check(hash_alg)?;
        Ok(Self {
            hash_alg,
            cid_version,
        })
    }
}

/// A serialized node together with its identity.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub id: ContentId,
    pub bytes: Vec<u8>,
    /// Cumulative size: serialized length plus all link sizes.
    pub size: u64,
}

/// Serialize a node to bytes.
pub fn serialize(node: &DagNode) -> Vec<u8> {
    let (kind, depth) = match node {
        DagNode::File { .. } => (KIND_FILE, 0),
        DagNode::Directory { .. } => (KIND_DIRECTORY, 0),
        DagNode::Shard(shard) => (KIND_SHARD, shard.depth),
    };

    let mut body = Vec::new();
    match node {
        DagNode::File { data } => body.extend_from_slice(data),
        DagNode::Directory { links } => {
            for link in links.values() {
                link.encode(&mut body);
            }
        }
        DagNode::Shard(shard) => {
            for (index, slot) in &shard.slots {
                body.push(*index);
                match slot {
                    Slot::Entry(link) => {
                        body.push(SLOT_ENTRY);
                        link.encode(&mut body);
                    }
                    Slot::Child { id, size } => {
                        body.push(SLOT_CHILD);
                        body.extend_from_slice(&id.to_bytes());
                        body.extend_from_slice(&size.to_le_bytes());
                    }
                }
            }
        }
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(MAGIC);
    buf.push(FORMAT_VERSION);
    buf.push(kind);
    buf.push(depth);
    buf.push(0);
    buf.extend_from_slice(&(body.len() as u64).to_le_bytes());
    buf.extend_from_slice(&body);
    buf
}

/// Deserialize the block stored under `id`.
pub fn deserialize(id: &ContentId, bytes: &[u8]) -> Result<DagNode> {
    decode(bytes).map_err(|reason| Error::corrupt_node(id, reason))
}

/// Compute the id of serialized bytes.
pub fn compute_id(bytes: &[u8], config: HashConfig) -> Result<ContentId> {
    ContentId::compute(bytes, config.hash_alg, config.cid_version)
}

/// Serialize a node and compute its id and cumulative size.
pub fn encode(node: &DagNode, config: HashConfig) -> Result<Encoded> {
    let bytes = serialize(node);
    let id = compute_id(&bytes, config)?;
    let size = node.cumulative_size(bytes.len());
    Ok(Encoded { id, bytes, size })
}

fn decode(bytes: &[u8]) -> std::result::Result<DagNode, String> {
    if bytes.len() < HEADER_SIZE {
        return Err(format!(
            "Header too short: {} bytes (expected {})",
            bytes.len(),
            HEADER_SIZE
        ));
    }

    if &bytes[0..4] != MAGIC {
        return Err(format!(
            "Invalid magic: expected {:?}, got {:?}",
            MAGIC,
            &bytes[0..4]
        ));
    }

    if bytes[4] != FORMAT_VERSION {
        return Err(format!("Unsupported node format version: {}", bytes[4]));
    }

    if bytes[7] != 0 {
        return Err(format!("Reserved byte must be 0, got {}", bytes[7]));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[8..16]);
    let body_len = u64::from_le_bytes(len_bytes);
    let body = &bytes[HEADER_SIZE..];
    if body.len() as u64 != body_len {
        return Err(format!(
            "Body length mismatch: expected {}, got {}",
            body_len,
            body.len()
        ));
    }

    let kind = bytes[5];
    let depth = bytes[6];
    if kind != KIND_SHARD && depth != 0 {
        return Err(format!("Depth {} set on a non-shard node", depth));
    }

    match kind {
        KIND_FILE => Ok(DagNode::File {
            data: body.to_vec(),
        }),
        KIND_DIRECTORY => {
            let mut reader = Cursor::new(body);
            let mut links = BTreeMap::new();
            while reader.position() < body.len() as u64 {
                let link = Link::decode(&mut reader)?;
                if links.insert(link.name.clone(), link).is_some() {
                    return Err("duplicate link name in directory".to_string());
                }
            }
            Ok(DagNode::Directory { links })
        }
        KIND_SHARD => {
            let mut reader = Cursor::new(body);
            let mut shard = ShardNode::new(depth);
            while reader.position() < body.len() as u64 {
                let mut head = [0u8; 2];
                reader
                    .read_exact(&mut head)
                    .map_err(|e| format!("truncated shard slot: {}", e))?;
                let slot = match head[1] {
                    SLOT_ENTRY => Slot::Entry(Link::decode(&mut reader)?),
                    SLOT_CHILD => {
                        let (id, size) = decode_id_size(&mut reader)?;
                        Slot::Child { id, size }
                    }
                    other => return Err(format!("Invalid shard slot tag: {}", other)),
                };
                if shard.slots.insert(head[0], slot).is_some() {
                    return Err(format!("duplicate shard slot {}", head[0]));
                }
            }
            Ok(DagNode::Shard(shard))
        }
        other => Err(format!("Invalid node kind: {}", other)),
    }
}
