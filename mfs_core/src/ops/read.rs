//! Read-only queries against a root snapshot.

use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::node::{DagNode, Link, NodeKind};
use crate::resolve::{MfsPath, PathDescriptor, resolve};
use crate::shard;
use crate::store::{BlockStore, load_node};
use serde::Serialize;

/// What `stat` reports about a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatInfo {
    pub id: ContentId,
    pub kind: NodeKind,
    /// Byte length of a file; 0 for directories.
    pub size: u64,
    /// Serialized size of the node plus everything it links to.
    pub cumulative_size: u64,
    /// Number of entries, for directories.
    pub entries: Option<usize>,
}

async fn existing(
    store: &dyn BlockStore,
    root: &ContentId,
    path: &str,
) -> Result<(PathDescriptor, ContentId)> {
    let parsed = MfsPath::parse(path)?;
    let desc = resolve(store, root, &parsed).await?;
    match desc.id {
        Some(id) => Ok((desc, id)),
        None => Err(Error::not_found(parsed.to_string())),
    }
}

async fn entries(store: &dyn BlockStore, node: &DagNode) -> Result<Vec<Link>> {
    match node {
        DagNode::File { .. } => Ok(Vec::new()),
        DagNode::Directory { links } => Ok(links.values().cloned().collect()),
        DagNode::Shard(root) => shard::entries(store, root).await,
    }
}

pub(super) async fn stat(store: &dyn BlockStore, root: &ContentId, path: &str) -> Result<StatInfo> {
    let (desc, id) = existing(store, root, path).await?;
    let node = load_node(store, &id).await?;

    let (size, entries) = match &node {
        DagNode::File { data } => (data.len() as u64, None),
        dir => (0, Some(entries(store, dir).await?.len())),
    };

    Ok(StatInfo {
        id,
        kind: node.kind(),
        size,
        cumulative_size: desc.size.unwrap_or_default(),
        entries,
    })
}

/// Directory entries sorted by name; a file lists as itself.
pub(super) async fn list(store: &dyn BlockStore, root: &ContentId, path: &str) -> Result<Vec<Link>> {
    let (desc, id) = existing(store, root, path).await?;
    let node = load_node(store, &id).await?;

    if let DagNode::File { .. } = node {
        return Ok(vec![Link {
            name: desc.name,
            id,
            size: desc.size.unwrap_or_default(),
        }]);
    }
    entries(store, &node).await
}

pub(super) async fn read_file(
    store: &dyn BlockStore,
    root: &ContentId,
    path: &str,
) -> Result<Vec<u8>> {
    let (_, id) = existing(store, root, path).await?;
    match load_node(store, &id).await? {
        DagNode::File { data } => Ok(data),
        _ => Err(Error::invalid_params(format!("{} is not a file", path))),
    }
}

pub(super) async fn id_at(store: &dyn BlockStore, root: &ContentId, path: &str) -> Result<ContentId> {
    existing(store, root, path).await.map(|(_, id)| id)
}
