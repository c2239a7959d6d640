//! Sharded directories.
//!
//! A directory whose entry count passes the split threshold is stored as a
//! hash-indexed multi-way tree. Each level is a [`ShardNode`] with up to 256
//! slots; an entry lives in the slot selected by byte `depth` of the BLAKE3
//! hash of its name. When two names collide on a slot, the slot becomes a
//! child shard one level deeper.
//!
//! The tree is canonical: a child shard exists exactly when two or more
//! entries share its slot, so the same set of entries always produces the same
//! shards and the same id regardless of insertion order.

use crate::codec::{Encoded, HashConfig};
use crate::error::{Error, Result};
use crate::hash::{ContentId, DIGEST_SIZE};
use crate::node::{DagNode, Link, ShardNode, Slot};
use crate::store::{BlockStore, load_node, put_node};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Slot of `name` in a shard at `depth`.
pub fn slot_index(name: &str, depth: u8) -> Result<u8> {
    let hash = blake3::hash(name.as_bytes());
    let depth = depth as usize;
    if depth >= DIGEST_SIZE {
        return Err(Error::invalid_params(format!(
            "shard depth {} exceeds name hash length",
            depth
        )));
    }
    Ok(hash.as_bytes()[depth])
}

/// How a directory with a given set of entries is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryLayout {
    Flat(Vec<Link>),
    Sharded(ShardTree),
}

/// Choose the encoding for `entries`: flat up to `threshold` entries,
/// sharded beyond it.
pub fn layout(entries: Vec<Link>, threshold: usize) -> Result<DirectoryLayout> {
    if entries.len() > threshold {
        let mut tree = ShardTree::new(0);
        for link in entries {
            tree.insert(link)?;
        }
        Ok(DirectoryLayout::Sharded(tree))
    } else {
        Ok(DirectoryLayout::Flat(entries))
    }
}

/// An unpersisted shard tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTree {
    depth: u8,
    slots: BTreeMap<u8, TreeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TreeSlot {
    Entry(Link),
    Child(Box<ShardTree>),
}

impl ShardTree {
    fn new(depth: u8) -> Self {
        Self {
            depth,
            slots: BTreeMap::new(),
        }
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, link: Link) -> Result<()> {
        let index = slot_index(&link.name, self.depth)?;
        match self.slots.remove(&index) {
            None => {
                self.slots.insert(index, TreeSlot::Entry(link));
            }
            Some(TreeSlot::Entry(existing)) if existing.name == link.name => {
                self.slots.insert(index, TreeSlot::Entry(link));
            }
            Some(TreeSlot::Entry(existing)) => {
                let mut child = ShardTree::new(self.depth + 1);
                child.insert(existing)?;
                child.insert(link)?;
                self.slots.insert(index, TreeSlot::Child(Box::new(child)));
            }
            Some(TreeSlot::Child(mut child)) => {
                child.insert(link)?;
                self.slots.insert(index, TreeSlot::Child(child));
            }
        }
        Ok(())
    }

    /// Number of entries in the whole tree.
    pub fn len(&self) -> usize {
        self.slots
            .values()
            .map(|slot| match slot {
                TreeSlot::Entry(_) => 1,
                TreeSlot::Child(child) => child.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Deepest shard level in the tree (0 for a single level).
    pub fn height(&self) -> u8 {
        self.slots
            .values()
            .map(|slot| match slot {
                TreeSlot::Entry(_) => 0,
                TreeSlot::Child(child) => child.height() + 1,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Persist every child of `tree` and return its root level (unpersisted).
pub fn persist_tree<'a>(
    store: &'a dyn BlockStore,
    tree: &'a ShardTree,
    config: HashConfig,
) -> BoxFuture<'a, ShardNode> {
    Box::pin(async move {
        let mut node = ShardNode::new(tree.depth);
        for (index, slot) in &tree.slots {
            let slot = match slot {
                TreeSlot::Entry(link) => Slot::Entry(link.clone()),
                TreeSlot::Child(child) => {
                    let child_node = persist_tree(store, child, config).await?;
                    let enc = put_node(store, &DagNode::Shard(child_node), config).await?;
                    Slot::Child {
                        id: enc.id,
                        size: enc.size,
                    }
                }
            };
            node.slots.insert(*index, slot);
        }
        Ok(node)
    })
}

async fn load_shard(store: &dyn BlockStore, id: &ContentId, depth: u8) -> Result<ShardNode> {
    match load_node(store, id).await? {
        DagNode::Shard(shard) if shard.depth == depth => Ok(shard),
        DagNode::Shard(shard) => Err(Error::corrupt_node(
            id,
            format!("expected shard depth {}, got {}", depth, shard.depth),
        )),
        other => Err(Error::corrupt_node(
            id,
            format!("expected shard, got {}", other.kind().as_str()),
        )),
    }
}

async fn put_child(store: &dyn BlockStore, child: ShardNode, config: HashConfig) -> Result<Slot> {
    let Encoded { id, size, .. } = put_node(store, &DagNode::Shard(child), config).await?;
    Ok(Slot::Child { id, size })
}

/// Insert `link` into a persisted shard, returning the new shard level.
///
/// Changed child shards are persisted; the returned level is not.
pub fn insert<'a>(
    store: &'a dyn BlockStore,
    shard: &'a ShardNode,
    link: Link,
    overwrite: bool,
    config: HashConfig,
) -> BoxFuture<'a, ShardNode> {
    Box::pin(async move {
        let index = slot_index(&link.name, shard.depth)?;
        let mut next = shard.clone();

        let slot = match shard.slots.get(&index) {
            None => Slot::Entry(link),
            Some(Slot::Entry(existing)) if existing.name == link.name => {
                if existing.id != link.id && !overwrite {
                    return Err(Error::already_exists(link.name));
                }
                Slot::Entry(link)
            }
            Some(Slot::Entry(existing)) => {
                let mut tree = ShardTree::new(shard.depth + 1);
                tree.insert(existing.clone())?;
                tree.insert(link)?;
                let child = persist_tree(store, &tree, config).await?;
                put_child(store, child, config).await?
            }
            Some(Slot::Child { id, .. }) => {
                let child = load_shard(store, id, shard.depth + 1).await?;
                let child = insert(store, &child, link, overwrite, config).await?;
                put_child(store, child, config).await?
            }
        };

        next.slots.insert(index, slot);
        Ok(next)
    })
}

/// Remove `name` from a persisted shard. `None` when the name is absent.
pub fn remove<'a>(
    store: &'a dyn BlockStore,
    shard: &'a ShardNode,
    name: &'a str,
    config: HashConfig,
) -> BoxFuture<'a, Option<ShardNode>> {
    Box::pin(async move {
        let index = slot_index(name, shard.depth)?;
        let mut next = shard.clone();

        match shard.slots.get(&index) {
            None => return Ok(None),
            Some(Slot::Entry(existing)) if existing.name == name => {
                next.slots.remove(&index);
            }
            Some(Slot::Entry(_)) => return Ok(None),
            Some(Slot::Child { id, .. }) => {
                let child = load_shard(store, id, shard.depth + 1).await?;
                let Some(child) = remove(store, &child, name, config).await? else {
                    return Ok(None);
                };

                // Keep the tree canonical: a lone entry moves back up
                let lone_entry = match child.slots.values().next() {
                    Some(Slot::Entry(last)) if child.slots.len() == 1 => Some(last.clone()),
                    _ => None,
                };

                if child.slots.is_empty() {
                    next.slots.remove(&index);
                } else if let Some(last) = lone_entry {
                    next.slots.insert(index, Slot::Entry(last));
                } else {
                    next.slots.insert(index, put_child(store, child, config).await?);
                }
            }
        }

        Ok(Some(next))
    })
}

/// Look up `name` in a persisted shard.
pub fn find<'a>(
    store: &'a dyn BlockStore,
    shard: &'a ShardNode,
    name: &'a str,
) -> BoxFuture<'a, Option<Link>> {
    Box::pin(async move {
        let index = slot_index(name, shard.depth)?;
        match shard.slots.get(&index) {
            None => Ok(None),
            Some(Slot::Entry(link)) if link.name == name => Ok(Some(link.clone())),
            Some(Slot::Entry(_)) => Ok(None),
            Some(Slot::Child { id, .. }) => {
                let child = load_shard(store, id, shard.depth + 1).await?;
                find(store, &child, name).await
            }
        }
    })
}

/// Every entry of a persisted shard tree, sorted by name.
pub async fn entries(store: &dyn BlockStore, shard: &ShardNode) -> Result<Vec<Link>> {
    let mut out = Vec::new();
    collect(store, shard, &mut out).await?;
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn collect<'a>(
    store: &'a dyn BlockStore,
    shard: &'a ShardNode,
    out: &'a mut Vec<Link>,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        for slot in shard.slots.values() {
            match slot {
                Slot::Entry(link) => out.push(link.clone()),
                Slot::Child { id, .. } => {
                    let child = load_shard(store, id, shard.depth + 1).await?;
                    collect(store, &child, out).await?;
                }
            }
        }
        Ok(())
    })
}
