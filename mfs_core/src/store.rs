//! Block stores and node I/O.
//!
//! A [`BlockStore`] maps content ids to bytes. Writes are idempotent: putting
//! the same id twice is a no-op, so stores need no coordination between
//! concurrent writers.

use crate::block;
use crate::codec::{self, Encoded, HashConfig};
use crate::error::{Error, Result};
use crate::hash::ContentId;
use crate::node::DagNode;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Content-addressed block persistence.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Fetch the bytes stored under `id`, or `NotFound`.
    ///
    /// Bytes come back as stored; [`load_node`] checks them against `id`.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>>;

    /// Durably store `bytes` under `id`.
    async fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<()>;

    /// Whether a block is present.
    async fn has(&self, id: &ContentId) -> Result<bool>;
}

/// Read and decode the node stored under `id`.
pub async fn load_node(store: &dyn BlockStore, id: &ContentId) -> Result<DagNode> {
    let bytes = store.get(id).await?;
    if !id.verify(&bytes) {
        return Err(Error::corrupt_node(id, "block bytes do not match id"));
    }
    codec::deserialize(id, &bytes)
}

/// Encode `node`, persist it, and return its identity.
pub async fn put_node(
    store: &dyn BlockStore,
    node: &DagNode,
    config: HashConfig,
) -> Result<Encoded> {
    let encoded = codec::encode(node, config)?;
    store.put(&encoded.id, &encoded.bytes).await?;
    trace!(id = %encoded.id, size = encoded.size, kind = node.kind().as_str(), "stored node");
    Ok(encoded)
}

/// A block store on the local filesystem.
///
/// Blocks live at `{root}/blocks/{prefix}/{suffix}`, framed with a
/// [`block::BlockHeader`] and written atomically.
#[derive(Debug, Clone)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Create the block directory under `root` and return a store for it.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("blocks"))?;
        Ok(Self { root })
    }

    /// Open an existing block directory under `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.join("blocks").is_dir() {
            return Err(Error::store_unavailable(format!(
                "{}: blocks directory missing",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Get the path to a block file given its id.
    ///
    /// Returns: `blocks/{prefix}/{suffix}`
    pub fn block_path(&self, id: &ContentId) -> PathBuf {
        block_path(&self.root, id)
    }
}

fn block_path(root: &Path, id: &ContentId) -> PathBuf {
    root.join("blocks").join(id.prefix()).join(id.suffix())
}

fn read_block(path: &Path, id: &ContentId) -> Result<Vec<u8>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found(format!("block {}", id)));
        }
        Err(e) => return Err(Error::store_unavailable(format!("{}: {}", path.display(), e))),
    };

    block::unframe(&raw).map_err(|reason| Error::corrupt_node(id, reason))
}

/// Write a block atomically using tempfile, syncing before the rename.
fn write_block_atomic(path: &Path, id: &ContentId, bytes: &[u8]) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let dir = path
        .parent()
        .ok_or_else(|| Error::store_unavailable(format!("{}: no parent", path.display())))?;
    fs::create_dir_all(dir)?;

    let framed = block::frame(id.algorithm(), bytes)?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(&framed)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

#[async_trait]
impl BlockStore for FsBlockStore {
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>> {
        let path = self.block_path(id);
        let id = *id;
        tokio::task::spawn_blocking(move || read_block(&path, &id)).await?
    }

    async fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<()> {
        let path = self.block_path(id);
        let id = *id;
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || write_block_atomic(&path, &id, &bytes)).await?
    }

    async fn has(&self, id: &ContentId) -> Result<bool> {
        let path = self.block_path(id);
        tokio::task::spawn_blocking(move || path.exists())
            .await
            .map_err(Error::from)
    }
}

/// An in-memory block store.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>> {
        self.blocks
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("block {}", id)))
    }

    async fn put(&self, id: &ContentId, bytes: &[u8]) -> Result<()> {
        self.blocks
            .write()
            .entry(*id)
            .or_insert_with(|| bytes.to_vec());
        Ok(())
    }

    async fn has(&self, id: &ContentId) -> Result<bool> {
        Ok(self.blocks.read().contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn file(data: &[u8]) -> DagNode {
        DagNode::File {
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_memory_put_get() {
        let store = MemoryBlockStore::new();
        let enc = put_node(&store, &file(b"hello"), HashConfig::default())
            .await
            .unwrap();
        assert!(store.has(&enc.id).await.unwrap());
        assert_eq!(load_node(&store, &enc.id).await.unwrap(), file(b"hello"));
    }

    #[tokio::test]
    async fn test_memory_dedup() {
        let store = MemoryBlockStore::new();
        put_node(&store, &file(b"same"), HashConfig::default())
            .await
            .unwrap();
        put_node(&store, &file(b"same"), HashConfig::default())
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_not_found() {
        let store = MemoryBlockStore::new();
        let id = codec::encode(&file(b"missing"), HashConfig::default())
            .unwrap()
            .id;
        let err = store.get(&id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_load_node_detects_mismatch() {
        let store = MemoryBlockStore::new();
        let real = codec::encode(&file(b"real"), HashConfig::default()).unwrap();
        let other = codec::encode(&file(b"other"), HashConfig::default()).unwrap();
        store.put(&real.id, &other.bytes).await.unwrap();

        let err = load_node(&store, &real.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptNode);
    }

    #[tokio::test]
    async fn test_fs_put_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlockStore::init(temp_dir.path()).unwrap();

        let enc = put_node(&store, &file(b"on disk"), HashConfig::default())
            .await
            .unwrap();
        let path = store.block_path(&enc.id);
        assert!(path.exists());
        assert!(path.starts_with(temp_dir.path().join("blocks").join(enc.id.prefix())));

        assert_eq!(load_node(&store, &enc.id).await.unwrap(), file(b"on disk"));
    }

    #[tokio::test]
    async fn test_fs_large_block_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlockStore::init(temp_dir.path()).unwrap();

        let node = file(&vec![7u8; 64 * 1024]);
        let enc = put_node(&store, &node, HashConfig::default()).await.unwrap();

        // compressed on disk
        let on_disk = fs::metadata(store.block_path(&enc.id)).unwrap().len();
        assert!(on_disk < enc.bytes.len() as u64);
        assert_eq!(load_node(&store, &enc.id).await.unwrap(), node);
    }

    #[tokio::test]
    async fn test_fs_corruption_detection() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlockStore::init(temp_dir.path()).unwrap();
        let enc = put_node(&store, &file(b"test"), HashConfig::default())
            .await
            .unwrap();

        let path = store.block_path(&enc.id);
        let mut raw = fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;
        fs::write(&path, raw).unwrap();

        let err = load_node(&store, &enc.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptNode);
    }

    #[tokio::test]
    async fn test_fs_open_requires_blocks_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FsBlockStore::open(temp_dir.path()).is_err());
        FsBlockStore::init(temp_dir.path()).unwrap();
        assert!(FsBlockStore::open(temp_dir.path()).is_ok());
    }

    #[tokio::test]
    async fn test_fs_missing_block() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlockStore::init(temp_dir.path()).unwrap();
        let id = codec::encode(&file(b"nope"), HashConfig::default())
            .unwrap()
            .id;
        assert!(!store.has(&id).await.unwrap());
        assert_eq!(
            store.get(&id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
