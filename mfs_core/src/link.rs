//! Adding and removing directory entries.
//!
//! Both mutators return a new directory node and never touch the parent they
//! were given. Every node they produce is persisted before its id is
//! returned, so a parent can never reference a child that is not yet stored.

use crate::codec::HashConfig;
use crate::config::DEFAULT_SHARD_SPLIT_THRESHOLD;
use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::node::{DagNode, Link};
use crate::shard::{self, DirectoryLayout};
use crate::store::{BlockStore, put_node};
use tracing::debug;

/// Options for [`add_link`] and [`rm_link`].
#[derive(Debug, Clone, Copy)]
pub struct LinkOptions {
    pub hash: HashConfig,
    /// Flat directories holding more entries than this are sharded.
    pub shard_split_threshold: usize,
    /// Replace an entry of the same name that points elsewhere.
    pub overwrite: bool,
    /// Removing a missing entry is a no-op instead of `NotFound`.
    pub force: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            shard_split_threshold: DEFAULT_SHARD_SPLIT_THRESHOLD,
            overwrite: false,
            force: false,
        }
    }
}

/// A freshly stored directory node.
#[derive(Debug, Clone)]
pub struct Mutated {
    pub node: DagNode,
    pub id: ContentId,
    /// Cumulative size of `node`.
    pub size: u64,
}

async fn store_node(store: &dyn BlockStore, node: DagNode, hash: HashConfig) -> Result<Mutated> {
    let enc = put_node(store, &node, hash).await?;
    Ok(Mutated {
        node,
        id: enc.id,
        size: enc.size,
    })
}

/// Insert or replace `entry` in `parent`.
///
/// A flat directory that grows past the split threshold is converted to a
/// sharded one before its id is computed.
pub async fn add_link(
    store: &dyn BlockStore,
    parent: &DagNode,
    entry: Link,
    options: &LinkOptions,
) -> Result<Mutated> {
    let node = match parent {
        DagNode::File { .. } => return Err(Error::not_a_directory(parent_of(&entry.name))),
        DagNode::Directory { links } => {
            if let Some(existing) = links.get(&entry.name)
                && existing.id != entry.id
                && !options.overwrite
            {
                return Err(Error::already_exists(entry.name));
            }

            let mut links = links.clone();
            links.insert(entry.name.clone(), entry);

            match shard::layout(links.into_values().collect(), options.shard_split_threshold)? {
                DirectoryLayout::Flat(links) => DagNode::directory(links),
                DirectoryLayout::Sharded(tree) => {
                    debug!(
                        entries = tree.len(),
                        threshold = options.shard_split_threshold,
                        "converting directory to sharded encoding"
                    );
                    DagNode::Shard(shard::persist_tree(store, &tree, options.hash).await?)
                }
            }
        }
        DagNode::Shard(root) => DagNode::Shard(
            shard::insert(store, root, entry, options.overwrite, options.hash).await?,
        ),
    };

    store_node(store, node, options.hash).await
}

/// Remove the entry called `name` from `parent`.
///
/// Sharded directories stay sharded however small they become.
pub async fn rm_link(
    store: &dyn BlockStore,
    parent: &DagNode,
    name: &str,
    options: &LinkOptions,
) -> Result<Mutated> {
    let node = match parent {
        DagNode::File { .. } => return Err(Error::not_a_directory(parent_of(name))),
        DagNode::Directory { links } => {
            if links.contains_key(name) {
                let mut links = links.clone();
                links.remove(name);
                Some(DagNode::Directory { links })
            } else {
                None
            }
        }
        DagNode::Shard(root) => shard::remove(store, root, name, options.hash)
            .await?
            .map(DagNode::Shard),
    };

    match node {
        Some(node) => store_node(store, node, options.hash).await,
        None if options.force => store_node(store, parent.clone(), options.hash).await,
        None => Err(Error::not_found(name)),
    }
}

fn parent_of(name: &str) -> String {
    format!("parent of {}", name)
}
