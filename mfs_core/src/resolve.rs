//! Path parsing and resolution.
//!
//! A path is either namespace-absolute (`/a/b`) or a reference into an
//! arbitrary tree by id (`/ipfs/<id>/a/b`). Resolution walks one named link
//! per segment from the starting node and reports what exists there.

use crate::codec;
use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::node::{DagNode, Link, NodeKind, validate_name};
use crate::shard;
use crate::store::{BlockStore, load_node};
use serde::Serialize;
use std::fmt;

/// Leading segment that marks a raw id reference.
pub const REFERENCE_PREFIX: &str = "ipfs";

/// Where a path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "id")]
pub enum PathSource {
    /// The namespace root.
    Namespace,
    /// An arbitrary node, named by id.
    Reference(ContentId),
}

/// A parsed, normalised path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfsPath {
    pub source: PathSource,
    pub segments: Vec<String>,
}

impl MfsPath {
    /// The namespace root, `/`.
    pub fn root() -> Self {
        Self {
            source: PathSource::Namespace,
            segments: Vec::new(),
        }
    }

    /// Parse an absolute path.
    ///
    /// Empty and `.` segments are dropped; `..` is rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::invalid_params("paths must not be empty"));
        }
        if !path.starts_with('/') {
            return Err(Error::invalid_params(format!(
                "paths must start with a leading slash: {}",
                path
            )));
        }

        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(Error::invalid_params(format!(
                        "paths must not contain '..': {}",
                        path
                    )));
                }
                name => {
                    validate_name(name)?;
                    segments.push(name.to_string());
                }
            }
        }

        if segments.first().map(String::as_str) == Some(REFERENCE_PREFIX) {
            let id = segments.get(1).ok_or_else(|| {
                Error::invalid_params(format!("missing id after /{}", REFERENCE_PREFIX))
            })?;
            let id = ContentId::from_hex(id)?;
            return Ok(Self {
                source: PathSource::Reference(id),
                segments: segments.split_off(2),
            });
        }

        Ok(Self {
            source: PathSource::Namespace,
            segments,
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_namespace(&self) -> bool {
        self.source == PathSource::Namespace
    }

    /// Last segment, or `""` for a root.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The containing directory; `None` for a root.
    pub fn parent(&self) -> Option<MfsPath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            source: self.source,
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn join(&self, name: &str) -> MfsPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            source: self.source,
            segments,
        }
    }

    /// Whether `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &MfsPath) -> bool {
        self.source == other.source && self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for MfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PathSource::Reference(id) = &self.source {
            write!(f, "/{}/{}", REFERENCE_PREFIX, id)?;
        } else if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Snapshot of what exists at a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathDescriptor {
    pub path: String,
    pub segments: Vec<String>,
    pub source: PathSource,
    pub exists: bool,
    pub id: Option<ContentId>,
    pub kind: Option<NodeKind>,
    pub size: Option<u64>,
    pub name: String,
    /// How many leading segments exist.
    pub resolved: usize,
}

impl PathDescriptor {
    pub fn is_directory(&self) -> bool {
        self.kind.is_some_and(NodeKind::is_directory)
    }
}

/// Look up `name` among the entries of a directory node.
pub(crate) async fn child_link(
    store: &dyn BlockStore,
    node: &DagNode,
    name: &str,
) -> Result<Option<Link>> {
    match node {
        DagNode::File { .. } => Ok(None),
        DagNode::Directory { links } => Ok(links.get(name).cloned()),
        DagNode::Shard(root) => shard::find(store, root, name).await,
    }
}

/// Cumulative size of a node loaded without a parent link.
pub(crate) fn own_size(node: &DagNode) -> u64 {
    node.cumulative_size(codec::serialize(node).len())
}

/// Resolve `path` against the namespace root `root`.
pub async fn resolve(
    store: &dyn BlockStore,
    root: &ContentId,
    path: &MfsPath,
) -> Result<PathDescriptor> {
    let start = match path.source {
        PathSource::Namespace => *root,
        PathSource::Reference(id) => id,
    };

    let mut id = start;
    let mut node = load_node(store, &id).await?;
    let mut size = own_size(&node);

    for (depth, segment) in path.segments.iter().enumerate() {
        if !node.kind().is_directory() {
            let prefix = MfsPath {
                source: path.source,
                segments: path.segments[..depth].to_vec(),
            };
            return Err(Error::not_a_directory(prefix.to_string()));
        }

        let Some(link) = child_link(store, &node, segment).await? else {
            return Ok(descriptor(path, None, depth));
        };

        node = load_node(store, &link.id).await?;
        id = link.id;
        size = link.size;
    }

    Ok(descriptor(
        path,
        Some((id, node.kind(), size)),
        path.segments.len(),
    ))
}

fn descriptor(
    path: &MfsPath,
    found: Option<(ContentId, NodeKind, u64)>,
    resolved: usize,
) -> PathDescriptor {
    PathDescriptor {
        path: path.to_string(),
        segments: path.segments.clone(),
        source: path.source,
        exists: found.is_some(),
        id: found.map(|f| f.0),
        kind: found.map(|f| f.1),
        size: found.map(|f| f.2),
        name: path.name().to_string(),
        resolved,
    }
}
