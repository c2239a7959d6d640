//! DAG node types: file leaves, flat directories and directory shards.

use crate::error::{Error, Result};
use crate::hash::{ContentId, ID_SIZE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;

/// Maximum length of a link name in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// A named, sized reference from a directory to a child node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Name of the entry (UTF-8).
    pub name: String,
    /// Id of the child node.
    pub id: ContentId,
    /// Cumulative size of the child node.
    pub size: u64,
}

impl Link {
    /// Create a new link, validating the name.
    pub fn new(name: impl Into<String>, id: ContentId, size: u64) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, id, size })
    }

    /// Encode the link to bytes.
    ///
    /// Format:
    /// - 34 bytes: id
    /// - 8 bytes: size (u64 LE)
    /// - 1 byte: name_len
    /// - N bytes: name (UTF-8)
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.id.to_bytes());
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.push(self.name.len() as u8);
        buf.extend_from_slice(self.name.as_bytes());
    }

    /// Decode a link from a reader.
    pub fn decode<R: Read>(reader: &mut R) -> std::result::Result<Self, String> {
        let (id, size) = decode_id_size(reader)?;

        let mut name_len_buf = [0u8; 1];
        reader
            .read_exact(&mut name_len_buf)
            .map_err(|e| format!("truncated link name length: {}", e))?;
        let name_len = name_len_buf[0] as usize;
        if name_len == 0 {
            return Err("link name length is zero".to_string());
        }

        let mut name_buf = vec![0u8; name_len];
        reader
            .read_exact(&mut name_buf)
            .map_err(|e| format!("truncated link name: {}", e))?;
        let name =
            String::from_utf8(name_buf).map_err(|e| format!("invalid UTF-8 in name: {}", e))?;

        Link::new(name, id, size).map_err(|e| e.to_string())
    }
}

pub(crate) fn decode_id_size<R: Read>(
    reader: &mut R,
) -> std::result::Result<(ContentId, u64), String> {
    let mut id_buf = [0u8; ID_SIZE];
    reader
        .read_exact(&mut id_buf)
        .map_err(|e| format!("truncated id: {}", e))?;
    let id = ContentId::from_bytes(&id_buf).map_err(|e| e.to_string())?;

    let mut size_buf = [0u8; 8];
    reader
        .read_exact(&mut size_buf)
        .map_err(|e| format!("truncated size: {}", e))?;
    Ok((id, u64::from_le_bytes(size_buf)))
}

/// Validate an entry name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_params("Name cannot be empty"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(Error::invalid_params(format!(
            "Name too long: {} bytes (max {})",
            name.len(),
            MAX_NAME_LEN
        )));
    }

    if name.contains('\0') {
        return Err(Error::invalid_params("Name cannot contain null bytes"));
    }

    if name.contains('/') {
        return Err(Error::invalid_params("Name cannot contain '/'"));
    }

    Ok(())
}

/// One occupied slot of a directory shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A directory entry stored directly in this shard.
    Entry(Link),
    /// A deeper shard holding every entry that collides on this slot.
    Child { id: ContentId, size: u64 },
}

impl Slot {
    pub fn size(&self) -> u64 {
        match self {
            Slot::Entry(link) => link.size,
            Slot::Child { size, .. } => *size,
        }
    }
}

/// One level of a hash-indexed directory tree.
///
/// Depth 0 is the root of a sharded directory; deeper shards are only
/// reachable through `Slot::Child`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShardNode {
    pub depth: u8,
    pub slots: BTreeMap<u8, Slot>,
}

impl ShardNode {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            slots: BTreeMap::new(),
        }
    }
}

/// Kind of node found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Directory,
    ShardedDirectory,
}

impl NodeKind {
    pub fn is_directory(self) -> bool {
        matches!(self, NodeKind::Directory | NodeKind::ShardedDirectory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
            NodeKind::ShardedDirectory => "sharded-directory",
        }
    }
}

/// An immutable DAG node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagNode {
    /// A data-bearing leaf.
    File { data: Vec<u8> },
    /// A flat directory; links keyed (and ordered) by name.
    Directory { links: BTreeMap<String, Link> },
    /// A directory shard.
    Shard(ShardNode),
}

impl DagNode {
    /// An empty flat directory.
    pub fn empty_directory() -> Self {
        DagNode::Directory {
            links: BTreeMap::new(),
        }
    }

    /// A flat directory holding `links`.
    pub fn directory(links: impl IntoIterator<Item = Link>) -> Self {
        DagNode::Directory {
            links: links.into_iter().map(|l| (l.name.clone(), l)).collect(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            DagNode::File { .. } => NodeKind::File,
            DagNode::Directory { .. } => NodeKind::Directory,
            DagNode::Shard(_) => NodeKind::ShardedDirectory,
        }
    }

    /// Sum of the sizes of every link held directly by this node.
    pub fn links_size(&self) -> u64 {
        match self {
            DagNode::File { .. } => 0,
            DagNode::Directory { links } => links.values().map(|l| l.size).sum(),
            DagNode::Shard(shard) => shard.slots.values().map(Slot::size).sum(),
        }
    }

    /// Cumulative size given the node's own serialized length.
    pub fn cumulative_size(&self, encoded_len: usize) -> u64 {
        encoded_len as u64 + self.links_size()
    }
}
