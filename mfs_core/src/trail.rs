//! Building the chain of ancestors a mutation must be propagated through.

use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::link::Mutated;
use crate::node::DagNode;
use crate::resolve::{child_link, own_size};
use crate::store::{BlockStore, load_node};

/// One directory on the way from the root to a mutation point.
#[derive(Debug, Clone)]
pub struct TrailFrame {
    /// Name of this directory in its parent (`""` for the root).
    pub name: String,
    pub id: ContentId,
    pub node: DagNode,
    /// Cumulative size.
    pub size: u64,
}

impl TrailFrame {
    /// Frame for a directory produced by the link mutator.
    pub fn from_mutated(name: impl Into<String>, mutated: Mutated) -> Self {
        Self {
            name: name.into(),
            id: mutated.id,
            node: mutated.node,
            size: mutated.size,
        }
    }
}

/// Walk from `root` along `segments`, collecting one frame per directory.
///
/// The trail is root-first and ends at the deepest segment that exists;
/// callers compare its length with `segments.len() + 1` to see how much of
/// the path is missing.
pub async fn build_trail(
    store: &dyn BlockStore,
    root: &ContentId,
    segments: &[String],
) -> Result<Vec<TrailFrame>> {
    let node = load_node(store, root).await?;
    let mut trail = vec![TrailFrame {
        name: String::new(),
        id: *root,
        size: own_size(&node),
        node,
    }];

    for (depth, segment) in segments.iter().enumerate() {
        let Some(parent) = trail.last() else {
            break;
        };
        if !parent.node.kind().is_directory() {
            return Err(Error::not_a_directory(format!(
                "/{}",
                segments[..depth].join("/")
            )));
        }

        let Some(link) = child_link(store, &parent.node, segment).await? else {
            break;
        };

        let node = load_node(store, &link.id).await?;
        trail.push(TrailFrame {
            name: link.name,
            id: link.id,
            node,
            size: link.size,
        });
    }

    Ok(trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::HashConfig;
    use crate::error::ErrorKind;
    use crate::link::{LinkOptions, add_link};
    use crate::node::Link;
    use crate::store::{MemoryBlockStore, put_node};

    fn trail_path(trail: &[TrailFrame]) -> String {
        let names: Vec<&str> = trail.iter().skip(1).map(|f| f.name.as_str()).collect();
        format!("/{}", names.join("/"))
    }

    async fn tree(store: &MemoryBlockStore) -> ContentId {
        let opts = LinkOptions::default();
        let f = put_node(
            store,
            &DagNode::File {
                data: b"f".to_vec(),
            },
            HashConfig::default(),
        )
        .await
        .unwrap();
        let b = add_link(
            store,
            &DagNode::empty_directory(),
            Link::new("f", f.id, f.size).unwrap(),
            &opts,
        )
        .await
        .unwrap();
        let a = add_link(
            store,
            &DagNode::empty_directory(),
            Link::new("b", b.id, b.size).unwrap(),
            &opts,
        )
        .await
        .unwrap();
        add_link(
            store,
            &DagNode::empty_directory(),
            Link::new("a", a.id, a.size).unwrap(),
            &opts,
        )
        .await
        .unwrap()
        .id
    }

    fn segments(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    #[tokio::test]
    async fn test_full_trail() {
        let store = MemoryBlockStore::new();
        let root = tree(&store).await;

        let trail = build_trail(&store, &root, &segments("/a/b")).await.unwrap();
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0].id, root);
        assert_eq!(trail[0].name, "");
        assert_eq!(trail_path(&trail), "/a/b");
    }

    #[tokio::test]
    async fn test_trail_stops_at_missing() {
        let store = MemoryBlockStore::new();
        let root = tree(&store).await;

        let trail = build_trail(&store, &root, &segments("/a/x/y"))
            .await
            .unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail_path(&trail), "/a");
    }

    #[tokio::test]
    async fn test_trail_through_file() {
        let store = MemoryBlockStore::new();
        let root = tree(&store).await;

        let err = build_trail(&store, &root, &segments("/a/b/f/g"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_root_only() {
        let store = MemoryBlockStore::new();
        let root = tree(&store).await;
        let trail = build_trail(&store, &root, &[]).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail_path(&trail), "/");
    }
}
